//! Module: metadata
//! Responsibility: build-once cache of resolved [`EntityTable`]s.
//!
//! Each mapped type owns a slot with its own build lock. Readers of a
//! published table never take that lock; only the first resolution of a
//! type (and anyone racing it) waits on it.

#[cfg(test)]
mod tests;

use crate::{
    chain::{ResolutionChain, ResolveContext},
    error::{ErrorClass, ErrorDetail, ErrorOrigin, InternalError},
    introspect::Introspect,
    model::{EntityTable, TypeRef},
    obs::{self, MetricsEvent, MetricsSink},
    style::StyleRegistry,
    sync::{lock, read, write},
};
use entimap_config::PropertySource;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock, RwLock},
};
use thiserror::Error as ThisError;

///
/// MetadataError
///

#[derive(Debug, ThisError)]
pub enum MetadataError {
    #[error("no table factory produced a mapping for '{mapped_type}'")]
    NoMappingFound { mapped_type: TypeRef },
}

impl From<MetadataError> for InternalError {
    fn from(err: MetadataError) -> Self {
        Self::classified(
            ErrorClass::NotFound,
            ErrorOrigin::Metadata,
            ErrorDetail::Metadata(err),
        )
    }
}

///
/// TableSlot
///

#[derive(Default)]
struct TableSlot {
    build: Mutex<()>,
    table: OnceLock<Arc<EntityTable>>,
}

///
/// EntityMetadataCache
///

pub struct EntityMetadataCache {
    catalog: Arc<dyn Introspect>,
    styles: Arc<StyleRegistry>,
    properties: Arc<dyn PropertySource>,
    chain: ResolutionChain,
    slots: RwLock<HashMap<TypeRef, Arc<TableSlot>>>,
    sink: Arc<dyn MetricsSink>,
}

impl EntityMetadataCache {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn Introspect>,
        styles: Arc<StyleRegistry>,
        properties: Arc<dyn PropertySource>,
        chain: ResolutionChain,
    ) -> Self {
        Self {
            catalog,
            styles,
            properties,
            chain,
            slots: RwLock::new(HashMap::new()),
            sink: obs::noop(),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn Introspect {
        self.catalog.as_ref()
    }

    /// Resolve `ty` to its table, building it on first use.
    ///
    /// Concurrent first callers block on the type's build lock and all
    /// receive the same `Arc`. A failed build publishes nothing and drops
    /// the type's slot, so the next call tries again.
    pub fn resolve(&self, ty: &TypeRef) -> Result<Arc<EntityTable>, InternalError> {
        loop {
            let slot = self.slot(ty);
            if let Some(table) = self.published(ty, &slot) {
                return Ok(table);
            }

            let _guard = lock(&slot.build);
            if let Some(table) = self.published(ty, &slot) {
                return Ok(table);
            }
            // A failed build evicted this slot while we waited.
            if !self.is_current(ty, &slot) {
                continue;
            }

            let table = match self.build(ty) {
                Ok(table) => Arc::new(table),
                Err(err) => {
                    self.evict(ty, &slot);
                    return Err(err);
                }
            };
            self.sink.record(MetricsEvent::MetadataBuild {
                mapped_type: ty.path(),
                columns: table.columns().len(),
            });
            log::debug!(
                "resolved table '{}' for {ty} with {} columns",
                table.storage_name(),
                table.columns().len()
            );

            return Ok(Arc::clone(slot.table.get_or_init(|| table)));
        }
    }

    /// Already-published table for `ty`, without building.
    #[must_use]
    pub fn cached(&self, ty: &TypeRef) -> Option<Arc<EntityTable>> {
        read(&self.slots)
            .get(ty)
            .and_then(|slot| slot.table.get().cloned())
    }

    /// Number of published tables.
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.slots)
            .values()
            .filter(|slot| slot.table.get().is_some())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every slot. Tables already handed out stay valid.
    pub fn clear(&self) {
        write(&self.slots).clear();
    }

    fn slot(&self, ty: &TypeRef) -> Arc<TableSlot> {
        if let Some(slot) = read(&self.slots).get(ty) {
            return Arc::clone(slot);
        }

        Arc::clone(write(&self.slots).entry(ty.clone()).or_default())
    }

    fn published(&self, ty: &TypeRef, slot: &TableSlot) -> Option<Arc<EntityTable>> {
        let table = slot.table.get()?;
        self.sink.record(MetricsEvent::MetadataHit {
            mapped_type: ty.path(),
        });

        Some(Arc::clone(table))
    }

    fn is_current(&self, ty: &TypeRef, slot: &Arc<TableSlot>) -> bool {
        read(&self.slots)
            .get(ty)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Drop a slot whose build failed, so unmapped types leave nothing
    /// behind.
    fn evict(&self, ty: &TypeRef, slot: &Arc<TableSlot>) {
        let mut slots = write(&self.slots);
        if slots.get(ty).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(ty);
        }
    }

    fn build(&self, ty: &TypeRef) -> Result<EntityTable, InternalError> {
        let cx = ResolveContext {
            catalog: self.catalog.as_ref(),
            styles: &self.styles,
            properties: self.properties.as_ref(),
        };

        let mut table = self
            .chain
            .create_table(&cx, ty)?
            .ok_or_else(|| MetadataError::NoMappingFound {
                mapped_type: ty.clone(),
            })?;
        self.chain.assemble(&cx, &mut table)?;
        table.mark_ready();

        Ok(table)
    }
}

impl std::fmt::Debug for EntityMetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityMetadataCache")
            .field("chain", &self.chain)
            .field("tables", &self.len())
            .finish_non_exhaustive()
    }
}
