use crate::model::{OrderDirection, TypeRef};
use std::sync::Arc;

///
/// AttributeKind
/// Coarse value category of an attribute; enough to drive template helpers.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttributeKind {
    Text,
    Integer,
    Decimal,
    Boolean,
    Temporal,
    Binary,
    /// Value object whose own attributes may expand into several columns.
    Composite(TypeRef),
    Other,
}

///
/// KeyTiming
/// Whether a generated key is produced before or after the write.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum KeyTiming {
    #[default]
    Before,
    After,
}

///
/// KeyStrategy
/// How a primary key value is obtained for inserts.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyStrategy {
    /// The storage engine generates the key and reports it back.
    GeneratedKeys,

    /// A follow-up query fetches the key after the write.
    AfterSql(String),

    /// A named in-process generator produces the key.
    Generator { name: String, timing: KeyTiming },
}

///
/// TableDeclaration
/// Type-level mapping declaration; its presence makes a type "mapped".
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TableDeclaration {
    pub name: Option<String>,
    pub style: Option<String>,
    pub result_map: Option<String>,
    pub auto_result_map: bool,
    pub props: Vec<(String, String)>,
}

impl TableDeclaration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    #[must_use]
    pub fn result_map(mut self, name: impl Into<String>) -> Self {
        self.result_map = Some(name.into());
        self
    }

    #[must_use]
    pub const fn auto_result_map(mut self) -> Self {
        self.auto_result_map = true;
        self
    }

    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.push((name.into(), value.into()));
        self
    }
}

///
/// ColumnDeclaration
/// Attribute-level column settings; unset fields take the defaults.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnDeclaration {
    pub name: Option<String>,
    pub id: bool,
    pub order_by: Option<OrderDirection>,
    pub order_priority: i32,
    pub selectable: bool,
    pub insertable: bool,
    pub updatable: bool,
    pub type_hint: Option<String>,
    pub value_codec: Option<String>,
    pub scale: Option<String>,
    pub props: Vec<(String, String)>,
}

impl Default for ColumnDeclaration {
    fn default() -> Self {
        Self {
            name: None,
            id: false,
            order_by: None,
            order_priority: 0,
            selectable: true,
            insertable: true,
            updatable: true,
            type_hint: None,
            value_codec: None,
            scale: None,
            props: Vec::new(),
        }
    }
}

impl ColumnDeclaration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn id(mut self) -> Self {
        self.id = true;
        self
    }

    #[must_use]
    pub const fn order_by(mut self, direction: OrderDirection, priority: i32) -> Self {
        self.order_by = Some(direction);
        self.order_priority = priority;
        self
    }

    #[must_use]
    pub const fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    #[must_use]
    pub const fn insertable(mut self, insertable: bool) -> Self {
        self.insertable = insertable;
        self
    }

    #[must_use]
    pub const fn updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    #[must_use]
    pub fn type_hint(mut self, hint: impl Into<String>) -> Self {
        self.type_hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn value_codec(mut self, codec: impl Into<String>) -> Self {
        self.value_codec = Some(codec.into());
        self
    }

    #[must_use]
    pub fn scale(mut self, scale: impl Into<String>) -> Self {
        self.scale = Some(scale.into());
        self
    }

    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.push((name.into(), value.into()));
        self
    }
}

///
/// Declaration
/// One declaration attached to an attribute.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Declaration {
    Column(ColumnDeclaration),
    Transient,
    KeyStrategy(KeyStrategy),
    Prop { name: String, value: String },
}

impl Declaration {
    #[must_use]
    pub const fn kind(&self) -> DeclarationKind {
        match self {
            Self::Column(_) => DeclarationKind::Column,
            Self::Transient => DeclarationKind::Transient,
            Self::KeyStrategy(_) => DeclarationKind::KeyStrategy,
            Self::Prop { .. } => DeclarationKind::Prop,
        }
    }
}

///
/// DeclarationKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DeclarationKind {
    Column,
    Transient,
    KeyStrategy,
    Prop,
}

///
/// Attribute
///
/// One introspected attribute of a type. Columns hold it as an
/// `Arc<Attribute>`, the opaque field reference.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    name: String,
    declaring_type: TypeRef,
    kind: AttributeKind,
    declarations: Vec<Declaration>,
}

impl Attribute {
    #[must_use]
    pub fn new(declaring_type: impl Into<TypeRef>, name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.into(),
            kind,
            declarations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    #[must_use]
    pub fn with_declarations(mut self, declarations: impl IntoIterator<Item = Declaration>) -> Self {
        self.declarations.extend(declarations);
        self
    }

    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type that declares this attribute (an ancestor for inherited ones).
    #[must_use]
    pub const fn declaring_type(&self) -> &TypeRef {
        &self.declaring_type
    }

    #[must_use]
    pub const fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, AttributeKind::Text)
    }

    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    #[must_use]
    pub fn has_declaration(&self, kind: DeclarationKind) -> bool {
        self.declarations.iter().any(|d| d.kind() == kind)
    }

    #[must_use]
    pub fn declaration(&self, kind: DeclarationKind) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.kind() == kind)
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.has_declaration(DeclarationKind::Transient)
    }

    #[must_use]
    pub fn column_declaration(&self) -> Option<&ColumnDeclaration> {
        match self.declaration(DeclarationKind::Column) {
            Some(Declaration::Column(column)) => Some(column),
            _ => None,
        }
    }

    #[must_use]
    pub fn key_strategy(&self) -> Option<&KeyStrategy> {
        match self.declaration(DeclarationKind::KeyStrategy) {
            Some(Declaration::KeyStrategy(strategy)) => Some(strategy),
            _ => None,
        }
    }

    /// Free-standing `Prop` declarations in declaration order.
    pub fn props(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Prop { name, value } => Some((name.as_str(), value.as_str())),
            _ => None,
        })
    }
}
