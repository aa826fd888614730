//! Module: chain
//! Responsibility: ordered factory pipelines that build an [`EntityTable`]
//! and its columns.
//!
//! Each link either produces a result or delegates to `next`, optionally
//! decorating what comes back. Links run by descending priority and the
//! default factories are always the tail.

mod composite;
mod defaults;


pub use composite::FlattenCompositeFactory;
pub use defaults::{DefaultEntityColumnFactory, DefaultEntityTableFactory};

use crate::{
    error::InternalError,
    introspect::Introspect,
    model::{Attribute, EntityColumn, EntityTable, TypeRef},
    style::StyleRegistry,
};
use entimap_config::PropertySource;
use std::sync::Arc;

///
/// ResolveContext
/// Collaborators visible to every factory during one resolution.
///

#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub catalog: &'a dyn Introspect,
    pub styles: &'a StyleRegistry,
    pub properties: &'a dyn PropertySource,
}

///
/// EntityTableFactory
///

pub trait EntityTableFactory: Send + Sync {
    /// Higher runs first.
    fn priority(&self) -> i32 {
        0
    }

    fn create_table(
        &self,
        cx: &ResolveContext<'_>,
        ty: &TypeRef,
        next: TableChain<'_>,
    ) -> Result<Option<EntityTable>, InternalError>;
}

///
/// EntityColumnFactory
///
/// One attribute may yield no column, one, or several.
///

pub trait EntityColumnFactory: Send + Sync {
    /// Higher runs first.
    fn priority(&self) -> i32 {
        0
    }

    fn create_columns(
        &self,
        cx: &ResolveContext<'_>,
        table: &EntityTable,
        attribute: &Arc<Attribute>,
        next: ColumnChain<'_>,
    ) -> Result<Option<Vec<EntityColumn>>, InternalError>;
}

///
/// TableChain
/// Remaining table links after the current one.
///

#[derive(Clone, Copy)]
pub struct TableChain<'a> {
    links: &'a [Arc<dyn EntityTableFactory>],
}

impl TableChain<'_> {
    pub fn create_table(
        self,
        cx: &ResolveContext<'_>,
        ty: &TypeRef,
    ) -> Result<Option<EntityTable>, InternalError> {
        match self.links.split_first() {
            Some((head, rest)) => head.create_table(cx, ty, TableChain { links: rest }),
            None => Ok(None),
        }
    }
}

///
/// ColumnChain
/// Remaining column links after the current one.
///

#[derive(Clone, Copy)]
pub struct ColumnChain<'a> {
    links: &'a [Arc<dyn EntityColumnFactory>],
}

impl ColumnChain<'_> {
    pub fn create_columns(
        self,
        cx: &ResolveContext<'_>,
        table: &EntityTable,
        attribute: &Arc<Attribute>,
    ) -> Result<Option<Vec<EntityColumn>>, InternalError> {
        match self.links.split_first() {
            Some((head, rest)) => {
                head.create_columns(cx, table, attribute, ColumnChain { links: rest })
            }
            None => Ok(None),
        }
    }
}

///
/// ResolutionChain
///

pub struct ResolutionChain {
    tables: Vec<Arc<dyn EntityTableFactory>>,
    columns: Vec<Arc<dyn EntityColumnFactory>>,
}

impl ResolutionChain {
    #[must_use]
    pub fn builder() -> ResolutionChainBuilder {
        ResolutionChainBuilder::default()
    }

    /// Run the table links for `ty`; `None` when every link declines.
    pub fn create_table(
        &self,
        cx: &ResolveContext<'_>,
        ty: &TypeRef,
    ) -> Result<Option<EntityTable>, InternalError> {
        TableChain {
            links: &self.tables,
        }
        .create_table(cx, ty)
    }

    /// Populate `table` from the mapped type's attributes.
    ///
    /// Own attributes come first in declaration order, then each ancestor
    /// (nearest first) in reverse declaration order, so inherited columns
    /// end up ahead of the type's own and keep their declared order.
    pub fn assemble(
        &self,
        cx: &ResolveContext<'_>,
        table: &mut EntityTable,
    ) -> Result<(), InternalError> {
        let ty = table.mapped_type().clone();
        let chain = ColumnChain {
            links: &self.columns,
        };

        let own = cx.catalog.own_attributes(&ty).iter();
        let ancestors = cx.catalog.ancestors(&ty);
        let inherited = ancestors
            .iter()
            .flat_map(|ancestor| cx.catalog.own_attributes(ancestor).iter().rev());

        for attribute in own.chain(inherited) {
            if attribute.is_transient() {
                continue;
            }
            let Some(columns) = chain.create_columns(cx, table, attribute)? else {
                continue;
            };

            if attribute.declaring_type() == &ty {
                for column in columns {
                    table.add_column(column);
                }
            } else {
                for column in columns.into_iter().rev() {
                    table.add_column(column);
                }
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn table_links(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn column_links(&self) -> usize {
        self.columns.len()
    }
}

impl Default for ResolutionChain {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for ResolutionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionChain")
            .field("tables", &self.tables.len())
            .field("columns", &self.columns.len())
            .finish()
    }
}

///
/// ResolutionChainBuilder
///

#[derive(Default)]
pub struct ResolutionChainBuilder {
    tables: Vec<Arc<dyn EntityTableFactory>>,
    columns: Vec<Arc<dyn EntityColumnFactory>>,
}

impl ResolutionChainBuilder {
    #[must_use]
    pub fn table_factory(mut self, factory: Arc<dyn EntityTableFactory>) -> Self {
        self.tables.push(factory);
        self
    }

    #[must_use]
    pub fn column_factory(mut self, factory: Arc<dyn EntityColumnFactory>) -> Self {
        self.columns.push(factory);
        self
    }

    /// Expand composite attributes into one column per inner attribute.
    #[must_use]
    pub fn flatten_composites(self) -> Self {
        self.column_factory(Arc::new(FlattenCompositeFactory))
    }

    /// Sort by descending priority (ties keep insertion order) and append
    /// the default factories.
    #[must_use]
    pub fn build(mut self) -> ResolutionChain {
        self.tables.sort_by_key(|f| std::cmp::Reverse(f.priority()));
        self.columns.sort_by_key(|f| std::cmp::Reverse(f.priority()));
        self.tables.push(Arc::new(DefaultEntityTableFactory));
        self.columns.push(Arc::new(DefaultEntityColumnFactory));

        ResolutionChain {
            tables: self.tables,
            columns: self.columns,
        }
    }
}
