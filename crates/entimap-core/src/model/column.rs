use crate::model::{Attribute, KeyStrategy, Props};
use derive_more::Display;
use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum OrderDirection {
    #[display("ASC")]
    Asc,
    #[display("DESC")]
    Desc,
}

///
/// EntityColumn
///
/// One mapped attribute. Two columns are equal when their storage names
/// are equal, whatever else differs.
///

#[derive(Clone, Debug)]
pub struct EntityColumn {
    column: String,
    attribute: Arc<Attribute>,
    property: String,
    primary_key: bool,
    order_direction: Option<OrderDirection>,
    order_priority: i32,
    selectable: bool,
    insertable: bool,
    updatable: bool,
    type_hint: Option<String>,
    value_codec: Option<String>,
    scale: Option<String>,
    key_strategy: Option<KeyStrategy>,
    props: Props,
}

impl EntityColumn {
    /// New column bound to `attribute`; the property name defaults to the
    /// attribute name.
    #[must_use]
    pub fn new(column: impl Into<String>, attribute: Arc<Attribute>) -> Self {
        let property = attribute.name().to_string();

        Self {
            column: column.into(),
            attribute,
            property,
            primary_key: false,
            order_direction: None,
            order_priority: 0,
            selectable: true,
            insertable: true,
            updatable: true,
            type_hint: None,
            value_codec: None,
            scale: None,
            key_strategy: None,
            props: Props::new(),
        }
    }

    // ------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------

    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    #[must_use]
    pub const fn primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    #[must_use]
    pub const fn order_by(mut self, direction: Option<OrderDirection>, priority: i32) -> Self {
        self.order_direction = direction;
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
    pub fn type_hint(mut self, hint: Option<String>) -> Self {
        self.type_hint = hint;
        self
    }

    #[must_use]
    pub fn value_codec(mut self, codec: Option<String>) -> Self {
        self.value_codec = codec;
        self
    }

    #[must_use]
    pub fn scale(mut self, scale: Option<String>) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn key_strategy(mut self, strategy: Option<KeyStrategy>) -> Self {
        self.key_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub const fn attribute(&self) -> &Arc<Attribute> {
        &self.attribute
    }

    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    #[must_use]
    pub const fn order_direction(&self) -> Option<OrderDirection> {
        self.order_direction
    }

    #[must_use]
    pub const fn order_priority(&self) -> i32 {
        self.order_priority
    }

    #[must_use]
    pub const fn is_selectable(&self) -> bool {
        self.selectable
    }

    #[must_use]
    pub const fn is_insertable(&self) -> bool {
        self.insertable
    }

    #[must_use]
    pub const fn is_updatable(&self) -> bool {
        self.updatable
    }

    #[must_use]
    pub fn type_hint_name(&self) -> Option<&str> {
        self.type_hint.as_deref()
    }

    #[must_use]
    pub fn value_codec_name(&self) -> Option<&str> {
        self.value_codec.as_deref()
    }

    #[must_use]
    pub fn scale_value(&self) -> Option<&str> {
        self.scale.as_deref()
    }

    #[must_use]
    pub const fn declared_key_strategy(&self) -> Option<&KeyStrategy> {
        self.key_strategy.as_ref()
    }

    #[must_use]
    pub const fn props(&self) -> &Props {
        &self.props
    }

    pub const fn props_mut(&mut self) -> &mut Props {
        &mut self.props
    }

    // ------------------------------------------------------------------
    // Template fragments
    // ------------------------------------------------------------------

    /// Property path with `prefix` prepended (`user.name`).
    #[must_use]
    pub fn property(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.property)
    }

    /// Parameter placeholder, e.g. `#{points, numericScale=4}`.
    #[must_use]
    pub fn variables(&self, prefix: &str) -> String {
        let mut out = format!("#{{{}", self.property(prefix));
        if let Some(hint) = &self.type_hint {
            out.push_str(", jdbcType=");
            out.push_str(hint);
        }
        if let Some(codec) = &self.value_codec {
            out.push_str(", typeHandler=");
            out.push_str(codec);
        }
        if let Some(scale) = &self.scale {
            out.push_str(", numericScale=");
            out.push_str(scale);
        }
        out.push('}');

        out
    }

    /// `column AS property`, or just `column` when both already match.
    #[must_use]
    pub fn column_as_property(&self, prefix: &str) -> String {
        let property = self.property(prefix);
        if self.column == property {
            property
        } else {
            format!("{} AS {property}", self.column)
        }
    }

    #[must_use]
    pub fn column_equals_property(&self, prefix: &str) -> String {
        format!("{} = {}", self.column, self.variables(prefix))
    }

    #[must_use]
    pub fn not_null_test(&self, prefix: &str) -> String {
        format!("{} != null", self.property(prefix))
    }

    /// Null test; text attributes additionally reject the empty string.
    #[must_use]
    pub fn not_empty_test(&self, prefix: &str) -> String {
        let not_null = self.not_null_test(prefix);
        if self.attribute.is_text() {
            format!("{not_null} and {} != ''", self.property(prefix))
        } else {
            not_null
        }
    }
}

impl PartialEq for EntityColumn {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column
    }
}

impl Eq for EntityColumn {}

impl Hash for EntityColumn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.column.hash(state);
    }
}
