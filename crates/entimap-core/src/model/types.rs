use derive_more::Display;
use std::sync::Arc;

///
/// TypeRef
///
/// Opaque, cheaply cloned handle naming one type by its full path
/// (`app::model::User`). Equality is path equality.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeRef(Arc<str>);

impl TypeRef {
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(Arc::from(path.as_ref()))
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Last path segment, accepting both `::` and `.` separators.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let path = self.path();
        let tail = path.rsplit("::").next().unwrap_or(path);

        tail.rsplit('.').next().unwrap_or(tail)
    }
}

impl From<&str> for TypeRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for TypeRef {
    fn from(path: String) -> Self {
        Self(Arc::from(path))
    }
}

impl From<&Self> for TypeRef {
    fn from(ty: &Self) -> Self {
        ty.clone()
    }
}

///
/// TypeShape
///
/// Structural view of a declared type as seen on a mapper signature: the
/// raw material for generic-argument inference.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeShape {
    /// A concrete, non-generic type.
    Named(TypeRef),

    /// A generic instantiation such as `Vec<User>`; only `args` are
    /// inspected during inference.
    Generic { base: TypeRef, args: Vec<Self> },

    /// Array or slice of the component shape.
    Array(Box<Self>),

    /// Bounded wildcard; lower bounds are tried before upper bounds.
    Wildcard { lower: Vec<Self>, upper: Vec<Self> },

    /// Unresolved type variable.
    Variable(String),

    /// No value (`()`).
    Unit,
}

impl TypeShape {
    #[must_use]
    pub fn named(ty: impl Into<TypeRef>) -> Self {
        Self::Named(ty.into())
    }

    #[must_use]
    pub fn generic(base: impl Into<TypeRef>, args: impl IntoIterator<Item = Self>) -> Self {
        Self::Generic {
            base: base.into(),
            args: args.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn array(component: Self) -> Self {
        Self::Array(Box::new(component))
    }

    /// First candidate inside this shape accepted by `accept`, walking in
    /// declaration order.
    pub fn find_type(&self, accept: &dyn Fn(&TypeRef) -> bool) -> Option<TypeRef> {
        match self {
            Self::Named(ty) => accept(ty).then(|| ty.clone()),
            Self::Generic { args, .. } => Self::find_in(args, accept),
            Self::Array(component) => component.find_type(accept),
            Self::Wildcard { lower, upper } => {
                Self::find_in(lower, accept).or_else(|| Self::find_in(upper, accept))
            }
            Self::Variable(_) | Self::Unit => None,
        }
    }

    /// First candidate across `shapes` accepted by `accept`.
    pub fn find_in(shapes: &[Self], accept: &dyn Fn(&TypeRef) -> bool) -> Option<TypeRef> {
        shapes.iter().find_map(|shape| shape.find_type(accept))
    }
}
