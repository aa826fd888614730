//! In-memory structural description of mapped types.
//!
//! A [`EntityTable`] owns an ordered list of [`EntityColumn`]s. Column
//! identity is the storage name; derived views (`id_columns`,
//! `insert_columns`, ...) are pure filters and never reorder the list.

mod attribute;
mod column;
mod props;
mod table;
mod types;

#[cfg(test)]
mod tests;

pub use attribute::{
    Attribute, AttributeKind, ColumnDeclaration, Declaration, DeclarationKind, KeyStrategy,
    KeyTiming, TableDeclaration,
};
pub use column::{EntityColumn, OrderDirection};
pub use props::Props;
pub use table::{EntityTable, ResultMapping};
pub use types::{TypeRef, TypeShape};
