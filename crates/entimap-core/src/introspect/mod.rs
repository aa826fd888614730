//! Module: introspect
//! Responsibility: the attribute and mapper descriptors the runtime reads.
//!
//! [`Introspect`] is the seam to whatever produces type metadata (a derive,
//! a build script, a hand-written catalog). [`StaticCatalog`] is the
//! in-memory implementation.


use crate::model::{Attribute, AttributeKind, Declaration, TableDeclaration, TypeRef, TypeShape};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

///
/// Introspect
///

pub trait Introspect: Send + Sync {
    /// Attributes declared directly on `ty`, in declaration order.
    fn own_attributes(&self, ty: &TypeRef) -> &[Arc<Attribute>];

    /// Ancestor chain of `ty`, nearest first. Never contains `ty` itself.
    fn ancestors(&self, ty: &TypeRef) -> Vec<TypeRef>;

    /// Type-level table declaration, if `ty` carries one.
    fn declaration(&self, ty: &TypeRef) -> Option<&TableDeclaration>;

    /// Mapper interface descriptor for `ty`.
    fn mapper(&self, ty: &TypeRef) -> Option<Arc<MapperDescriptor>>;

    /// A type is mapped when it carries a table declaration.
    fn is_mapped(&self, ty: &TypeRef) -> bool {
        self.declaration(ty).is_some()
    }
}

///
/// StatementKind
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum StatementKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

///
/// MethodOptions
/// Per-method execution options that can override a declared key strategy.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MethodOptions {
    pub use_generated_keys: bool,
    pub select_key: Option<String>,
}

///
/// MethodDescriptor
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MethodDescriptor {
    pub name: String,
    pub entity: Option<TypeRef>,
    pub return_type: TypeShape,
    pub params: Vec<TypeShape>,

    /// Generic arguments of the interface that declares this method, as
    /// seen from the concrete mapper.
    pub declaring_generic_args: Vec<TypeShape>,
    pub kind: StatementKind,
    pub options: MethodOptions,
}

impl MethodDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: None,
            return_type: TypeShape::Unit,
            params: Vec::new(),
            declaring_generic_args: Vec::new(),
            kind: StatementKind::Select,
            options: MethodOptions::default(),
        }
    }

    #[must_use]
    pub fn entity(mut self, ty: impl Into<TypeRef>) -> Self {
        self.entity = Some(ty.into());
        self
    }

    #[must_use]
    pub fn returns(mut self, shape: TypeShape) -> Self {
        self.return_type = shape;
        self
    }

    #[must_use]
    pub fn param(mut self, shape: TypeShape) -> Self {
        self.params.push(shape);
        self
    }

    #[must_use]
    pub fn declared_in(mut self, args: impl IntoIterator<Item = TypeShape>) -> Self {
        self.declaring_generic_args = args.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn kind(mut self, kind: StatementKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn options(mut self, options: MethodOptions) -> Self {
        self.options = options;
        self
    }
}

///
/// MapperDescriptor
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MapperDescriptor {
    pub ty: TypeRef,
    pub entity: Option<TypeRef>,
    pub generic_args: Vec<TypeShape>,
    pub methods: Vec<MethodDescriptor>,
}

impl MapperDescriptor {
    #[must_use]
    pub fn new(ty: impl Into<TypeRef>) -> Self {
        Self {
            ty: ty.into(),
            entity: None,
            generic_args: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn entity(mut self, ty: impl Into<TypeRef>) -> Self {
        self.entity = Some(ty.into());
        self
    }

    #[must_use]
    pub fn generic_args(mut self, args: impl IntoIterator<Item = TypeShape>) -> Self {
        self.generic_args = args.into_iter().collect();
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}

///
/// TypeDescriptor
///

#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    ty: TypeRef,
    parent: Option<TypeRef>,
    table: Option<TableDeclaration>,
    attributes: Vec<Arc<Attribute>>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new(ty: impl Into<TypeRef>) -> Self {
        Self {
            ty: ty.into(),
            parent: None,
            table: None,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn extends(mut self, parent: impl Into<TypeRef>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn table(mut self, declaration: TableDeclaration) -> Self {
        self.table = Some(declaration);
        self
    }

    /// Declare an attribute owned by this type.
    #[must_use]
    pub fn field(
        mut self,
        name: &str,
        kind: AttributeKind,
        declarations: impl IntoIterator<Item = Declaration>,
    ) -> Self {
        let attribute = Attribute::new(self.ty.clone(), name, kind).with_declarations(declarations);
        self.attributes.push(Arc::new(attribute));
        self
    }
}

///
/// StaticCatalog
///

#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    types: HashMap<TypeRef, TypeDescriptor>,
    mappers: HashMap<TypeRef, Arc<MapperDescriptor>>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.types.insert(descriptor.ty.clone(), descriptor);
        self
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: MapperDescriptor) -> Self {
        self.mappers.insert(mapper.ty.clone(), Arc::new(mapper));
        self
    }
}

impl Introspect for StaticCatalog {
    fn own_attributes(&self, ty: &TypeRef) -> &[Arc<Attribute>] {
        self.types
            .get(ty)
            .map(|descriptor| descriptor.attributes.as_slice())
            .unwrap_or(&[])
    }

    fn ancestors(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut seen = HashSet::from([ty.clone()]);
        let mut chain = Vec::new();
        let mut current = self.types.get(ty).and_then(|d| d.parent.clone());

        while let Some(parent) = current {
            if !seen.insert(parent.clone()) {
                break;
            }
            current = self.types.get(&parent).and_then(|d| d.parent.clone());
            chain.push(parent);
        }

        chain
    }

    fn declaration(&self, ty: &TypeRef) -> Option<&TableDeclaration> {
        self.types.get(ty).and_then(|d| d.table.as_ref())
    }

    fn mapper(&self, ty: &TypeRef) -> Option<Arc<MapperDescriptor>> {
        self.mappers.get(ty).cloned()
    }
}
