use crate::obs::{MetricsEvent, MetricsSink};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

///
/// CacheCounters
/// Point-in-time snapshot of a [`CountingSink`].
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CacheCounters {
    pub metadata_hits: u64,
    pub metadata_builds: u64,
    pub finder_hits: u64,
    pub finder_misses: u64,
    pub statements_registered: u64,
    pub statements_duplicate: u64,
    pub templates_rendered: u64,
    pub compile_hits: u64,
    pub compiles: u64,
    pub compile_failures: u64,
    pub statements_retired: u64,
    pub keys_prepared: u64,
    pub keys_generated: u64,
}

///
/// CountingSink
///
/// Process-local counters. Relaxed atomics are sufficient because the
/// numbers are diagnostics and never feed back into cache decisions.
///

#[derive(Debug, Default)]
pub struct CountingSink {
    metadata_hits: AtomicU64,
    metadata_builds: AtomicU64,
    finder_hits: AtomicU64,
    finder_misses: AtomicU64,
    statements_registered: AtomicU64,
    statements_duplicate: AtomicU64,
    templates_rendered: AtomicU64,
    compile_hits: AtomicU64,
    compiles: AtomicU64,
    compile_failures: AtomicU64,
    statements_retired: AtomicU64,
    keys_prepared: AtomicU64,
    keys_generated: AtomicU64,
}

impl CountingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> CacheCounters {
        CacheCounters {
            metadata_hits: self.metadata_hits.load(Ordering::Relaxed),
            metadata_builds: self.metadata_builds.load(Ordering::Relaxed),
            finder_hits: self.finder_hits.load(Ordering::Relaxed),
            finder_misses: self.finder_misses.load(Ordering::Relaxed),
            statements_registered: self.statements_registered.load(Ordering::Relaxed),
            statements_duplicate: self.statements_duplicate.load(Ordering::Relaxed),
            templates_rendered: self.templates_rendered.load(Ordering::Relaxed),
            compile_hits: self.compile_hits.load(Ordering::Relaxed),
            compiles: self.compiles.load(Ordering::Relaxed),
            compile_failures: self.compile_failures.load(Ordering::Relaxed),
            statements_retired: self.statements_retired.load(Ordering::Relaxed),
            keys_prepared: self.keys_prepared.load(Ordering::Relaxed),
            keys_generated: self.keys_generated.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSink for CountingSink {
    fn record(&self, event: MetricsEvent<'_>) {
        let (counter, amount) = match event {
            MetricsEvent::MetadataHit { .. } => (&self.metadata_hits, 1),
            MetricsEvent::MetadataBuild { .. } => (&self.metadata_builds, 1),
            MetricsEvent::FinderHit { .. } => (&self.finder_hits, 1),
            MetricsEvent::FinderMiss { .. } => (&self.finder_misses, 1),
            MetricsEvent::StatementRegistered { .. } => (&self.statements_registered, 1),
            MetricsEvent::StatementDuplicate { .. } => (&self.statements_duplicate, 1),
            MetricsEvent::TemplateRendered { .. } => (&self.templates_rendered, 1),
            MetricsEvent::CompileHit { .. } => (&self.compile_hits, 1),
            MetricsEvent::CompileComplete { .. } => (&self.compiles, 1),
            MetricsEvent::CompileFailed { .. } => (&self.compile_failures, 1),
            MetricsEvent::StatementRetired { .. } => (&self.statements_retired, 1),
            MetricsEvent::KeysPrepared { assigned, .. } => (&self.keys_prepared, assigned),
            MetricsEvent::KeysGenerated { assigned, .. } => (&self.keys_generated, assigned),
        };

        counter.fetch_add(amount as u64, Ordering::Relaxed);
    }
}
