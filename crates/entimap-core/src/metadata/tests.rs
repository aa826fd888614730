use super::*;
use crate::{
    chain::{ColumnChain, EntityColumnFactory, EntityTableFactory, TableChain},
    model::{Attribute, EntityColumn},
    obs::CountingSink,
    test_fixtures::{ADMIN, PLAIN, USER, catalog},
};
use entimap_config::MapSource;
use std::{
    sync::{
        Barrier,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
};

fn cache_with(chain: ResolutionChain) -> EntityMetadataCache {
    let properties: Arc<dyn PropertySource> = Arc::new(MapSource::new());
    let styles = Arc::new(StyleRegistry::new(properties.clone()));

    EntityMetadataCache::new(Arc::new(catalog()), styles, properties, chain)
}

///
/// CountingColumns
///

#[derive(Default)]
struct CountingColumns(AtomicUsize);

impl EntityColumnFactory for CountingColumns {
    fn create_columns(
        &self,
        cx: &ResolveContext<'_>,
        table: &EntityTable,
        attribute: &Arc<Attribute>,
        next: ColumnChain<'_>,
    ) -> Result<Option<Vec<EntityColumn>>, InternalError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        next.create_columns(cx, table, attribute)
    }
}

///
/// FailOnce
///

#[derive(Default)]
struct FailOnce(AtomicBool);

impl EntityTableFactory for FailOnce {
    fn create_table(
        &self,
        cx: &ResolveContext<'_>,
        ty: &TypeRef,
        next: TableChain<'_>,
    ) -> Result<Option<EntityTable>, InternalError> {
        if !self.0.swap(true, Ordering::SeqCst) {
            return Err(InternalError::new(
                ErrorClass::Internal,
                ErrorOrigin::Metadata,
                "transient failure",
            ));
        }
        next.create_table(cx, ty)
    }
}

#[test]
fn resolve_publishes_a_ready_table() {
    let cache = cache_with(ResolutionChain::default());
    let table = cache.resolve(&TypeRef::new(USER)).unwrap();

    assert!(table.is_ready());
    assert_eq!(table.base_column_list(), "id,name,sex");
    assert_eq!(cache.len(), 1);
}

#[test]
fn repeated_resolve_returns_the_same_instance() {
    let sink = Arc::new(CountingSink::new());
    let cache = cache_with(ResolutionChain::default()).with_sink(sink.clone());
    let ty = TypeRef::new(USER);

    let first = cache.resolve(&ty).unwrap();
    let second = cache.resolve(&ty).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    let counters = sink.snapshot();
    assert_eq!(counters.metadata_builds, 1);
    assert_eq!(counters.metadata_hits, 1);
}

#[test]
fn concurrent_first_use_builds_once() {
    const THREADS: usize = 8;
    let _ = env_logger::builder().is_test(true).try_init();

    let columns = Arc::new(CountingColumns::default());
    let sink = Arc::new(CountingSink::new());
    let cache = cache_with(
        ResolutionChain::builder()
            .column_factory(columns.clone())
            .build(),
    )
    .with_sink(sink.clone());
    let barrier = Barrier::new(THREADS);
    let ty = TypeRef::new(USER);

    let tables: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    cache.resolve(&ty).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(columns.0.load(Ordering::SeqCst), 3, "one call per attribute");
    assert_eq!(sink.snapshot().metadata_builds, 1);
    for table in &tables {
        assert!(Arc::ptr_eq(table, &tables[0]));
        assert_eq!(table.columns().len(), 3);
    }
}

#[test]
fn unmapped_type_fails_with_no_mapping_found() {
    let cache = cache_with(ResolutionChain::default());
    let err = cache.resolve(&TypeRef::new(PLAIN)).unwrap_err();

    assert!(err.is_no_mapping_found());
    assert_eq!(err.class, ErrorClass::NotFound);
    assert_eq!(err.origin, ErrorOrigin::Metadata);
    assert!(cache.is_empty());
}

#[test]
fn failed_lookups_leave_no_slots_behind() {
    let cache = cache_with(ResolutionChain::default());
    let plain = TypeRef::new(PLAIN);

    for _ in 0..3 {
        assert!(cache.resolve(&plain).is_err());
    }
    assert!(cache.resolve(&TypeRef::new("app::Missing")).is_err());
    assert_eq!(read(&cache.slots).len(), 0);

    cache.resolve(&TypeRef::new(USER)).unwrap();
    assert_eq!(read(&cache.slots).len(), 1);
}

#[test]
fn failed_build_is_retried() {
    let cache = cache_with(
        ResolutionChain::builder()
            .table_factory(Arc::new(FailOnce::default()))
            .build(),
    );
    let ty = TypeRef::new(USER);

    assert!(cache.resolve(&ty).is_err());
    assert!(cache.cached(&ty).is_none());
    assert!(!read(&cache.slots).contains_key(&ty));

    let table = cache.resolve(&ty).unwrap();
    assert!(table.is_ready());
}

#[test]
fn inherited_override_is_resolved_through_the_cache() {
    let cache = cache_with(ResolutionChain::default());
    let table = cache.resolve(&TypeRef::new(ADMIN)).unwrap();

    assert_eq!(table.column_names(), vec!["id", "name", "sex", "level"]);
}

#[test]
fn clear_forces_a_rebuild() {
    let cache = cache_with(ResolutionChain::default());
    let ty = TypeRef::new(USER);

    let first = cache.resolve(&ty).unwrap();
    cache.clear();
    let second = cache.resolve(&ty).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.column_names(), second.column_names());
}
