use crate::model::{EntityColumn, Props, TypeRef};

///
/// ResultMapping
/// How query results are mapped back onto the type.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ResultMapping {
    #[default]
    None,

    /// An externally declared result map, by name.
    Named(String),

    /// A result map generated from the column list.
    Auto,
}

///
/// EntityTable
///
/// Full table description of one mapped type. Built by the resolution
/// chain, latched `ready` once, then shared read-only as `Arc<EntityTable>`.
///

#[derive(Clone, Debug)]
pub struct EntityTable {
    storage_name: String,
    mapped_type: TypeRef,
    columns: Vec<EntityColumn>,
    style: String,
    result_mapping: ResultMapping,
    ready: bool,
    props: Props,
}

impl EntityTable {
    #[must_use]
    pub fn new(storage_name: impl Into<String>, mapped_type: TypeRef, style: impl Into<String>) -> Self {
        Self {
            storage_name: storage_name.into(),
            mapped_type,
            columns: Vec::new(),
            style: style.into(),
            result_mapping: ResultMapping::None,
            ready: false,
            props: Props::new(),
        }
    }

    #[must_use]
    pub fn with_result_mapping(mut self, mapping: ResultMapping) -> Self {
        self.result_mapping = mapping;
        self
    }

    #[must_use]
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    #[must_use]
    pub fn storage_name(&self) -> &str {
        &self.storage_name
    }

    #[must_use]
    pub const fn mapped_type(&self) -> &TypeRef {
        &self.mapped_type
    }

    /// Name of the naming style the table was resolved with.
    #[must_use]
    pub fn style(&self) -> &str {
        &self.style
    }

    #[must_use]
    pub const fn result_mapping(&self) -> &ResultMapping {
        &self.result_mapping
    }

    #[must_use]
    pub fn result_map(&self) -> Option<&str> {
        match &self.result_mapping {
            ResultMapping::Named(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub const fn auto_result_map(&self) -> bool {
        matches!(self.result_mapping, ResultMapping::Auto)
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    #[must_use]
    pub const fn props(&self) -> &Props {
        &self.props
    }

    pub const fn props_mut(&mut self) -> &mut Props {
        &mut self.props
    }

    /// Latch the table as fully resolved.
    pub(crate) const fn mark_ready(&mut self) {
        self.ready = true;
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Add one column, keeping names unique.
    ///
    /// A new column declared by an ancestor goes to the front; one declared
    /// by the mapped type itself is appended. Re-adding an existing name
    /// keeps the existing column and moves it to the front, so an override
    /// declared by the subtype precedes the inherited layout.
    pub fn add_column(&mut self, column: EntityColumn) {
        if let Some(pos) = self.columns.iter().position(|c| *c == column) {
            let existing = self.columns.remove(pos);
            self.columns.insert(0, existing);
        } else if column.attribute().declaring_type() == &self.mapped_type {
            self.columns.push(column);
        } else {
            self.columns.insert(0, column);
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[EntityColumn] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&EntityColumn> {
        self.columns.iter().find(|c| c.column() == name)
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(EntityColumn::column).collect()
    }

    #[must_use]
    pub fn properties(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.property("")).collect()
    }

    /// Key columns; every column when none is flagged.
    #[must_use]
    pub fn id_columns(&self) -> Vec<&EntityColumn> {
        let ids: Vec<_> = self.columns.iter().filter(|c| c.is_primary_key()).collect();
        if ids.is_empty() {
            self.columns.iter().collect()
        } else {
            ids
        }
    }

    #[must_use]
    pub fn normal_columns(&self) -> Vec<&EntityColumn> {
        self.columns.iter().filter(|c| !c.is_primary_key()).collect()
    }

    #[must_use]
    pub fn select_columns(&self) -> Vec<&EntityColumn> {
        self.columns.iter().filter(|c| c.is_selectable()).collect()
    }

    #[must_use]
    pub fn where_columns(&self) -> Vec<&EntityColumn> {
        self.columns.iter().collect()
    }

    #[must_use]
    pub fn insert_columns(&self) -> Vec<&EntityColumn> {
        self.columns.iter().filter(|c| c.is_insertable()).collect()
    }

    #[must_use]
    pub fn update_columns(&self) -> Vec<&EntityColumn> {
        self.columns.iter().filter(|c| c.is_updatable()).collect()
    }

    /// Columns carrying an order direction, by ascending priority.
    #[must_use]
    pub fn order_by_columns(&self) -> Option<Vec<&EntityColumn>> {
        let mut ordered: Vec<_> = self
            .columns
            .iter()
            .filter(|c| c.order_direction().is_some())
            .collect();
        if ordered.is_empty() {
            return None;
        }
        ordered.sort_by_key(|c| c.order_priority());

        Some(ordered)
    }

    // ------------------------------------------------------------------
    // Template fragments
    // ------------------------------------------------------------------

    #[must_use]
    pub fn base_column_list(&self) -> String {
        join(self.select_columns(), |c| c.column().to_string())
    }

    #[must_use]
    pub fn base_column_as_property_list(&self) -> String {
        join(self.select_columns(), |c| c.column_as_property(""))
    }

    #[must_use]
    pub fn insert_column_list(&self) -> String {
        join(self.insert_columns(), |c| c.column().to_string())
    }

    #[must_use]
    pub fn order_by_column_list(&self) -> Option<String> {
        self.order_by_columns().map(|columns| {
            join(columns, |c| match c.order_direction() {
                Some(direction) => format!("{} {direction}", c.column()),
                None => c.column().to_string(),
            })
        })
    }

    #[must_use]
    pub fn order_by_clause(&self) -> Option<String> {
        self.order_by_column_list()
            .map(|list| format!(" ORDER BY {list}"))
    }
}

fn join<'a>(
    columns: impl IntoIterator<Item = &'a EntityColumn>,
    f: impl Fn(&'a EntityColumn) -> String,
) -> String {
    columns.into_iter().map(f).collect::<Vec<_>>().join(",")
}
