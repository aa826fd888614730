//! Metrics sink boundary.
//!
//! Caches never touch counters directly. All instrumentation flows through
//! [`MetricsEvent`] and a [`MetricsSink`] injected at construction time.

mod counters;

pub use counters::{CacheCounters, CountingSink};

use std::sync::Arc;

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    MetadataHit {
        mapped_type: &'a str,
    },
    MetadataBuild {
        mapped_type: &'a str,
        columns: usize,
    },
    FinderHit {
        mapper: &'a str,
    },
    FinderMiss {
        mapper: &'a str,
    },
    StatementRegistered {
        key: &'a str,
    },
    StatementDuplicate {
        key: &'a str,
    },
    TemplateRendered {
        key: &'a str,
    },
    CompileHit {
        key: &'a str,
    },
    CompileComplete {
        key: &'a str,
        configuration: u64,
    },
    CompileFailed {
        key: &'a str,
    },
    StatementRetired {
        key: &'a str,
    },
    KeysPrepared {
        mapped_type: &'a str,
        assigned: usize,
    },
    KeysGenerated {
        mapped_type: &'a str,
        assigned: usize,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent<'_>);
}

///
/// NoopSink
/// Default sink; discards every event.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _event: MetricsEvent<'_>) {}
}

/// Shared default sink handle.
#[must_use]
pub fn noop() -> Arc<dyn MetricsSink> {
    Arc::new(NoopSink)
}
