use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    keygen::{KeyGenerator, Parameter},
    model::{EntityTable, KeyTiming},
    obs::{MetricsEvent, MetricsSink},
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

///
/// KeyBinding
/// How a compiled insert obtains its primary key.
///

#[derive(Clone, Debug, Default)]
pub enum KeyBinding {
    #[default]
    None,

    /// The storage engine reports generated keys back.
    GeneratedKeys { property: String, column: String },

    /// A follow-up query fetches the key after the write.
    AfterSql {
        property: String,
        column: String,
        sql: String,
    },

    /// An in-process generator assigns the key.
    Generator(Arc<KeyGenerationHook>),
}

impl KeyBinding {
    #[must_use]
    pub const fn hook(&self) -> Option<&Arc<KeyGenerationHook>> {
        match self {
            Self::Generator(hook) => Some(hook),
            _ => None,
        }
    }
}

///
/// KeyGenerationHook
///
/// Generator bound to one key column of one table. Assignment only fills
/// records whose key is still empty and whose type is the table's type.
///

pub struct KeyGenerationHook {
    generator: Arc<dyn KeyGenerator>,
    table: Arc<EntityTable>,
    column: String,
    timing: KeyTiming,
    concurrency: usize,
    attached: AtomicBool,
    prepared: AtomicUsize,
    sink: Arc<dyn MetricsSink>,
}

impl KeyGenerationHook {
    #[must_use]
    pub fn new(
        generator: Arc<dyn KeyGenerator>,
        table: Arc<EntityTable>,
        column: impl Into<String>,
        timing: KeyTiming,
        concurrency: usize,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            generator,
            table,
            column: column.into(),
            timing,
            concurrency,
            attached: AtomicBool::new(false),
            prepared: AtomicUsize::new(0),
            sink,
        }
    }

    #[must_use]
    pub const fn timing(&self) -> KeyTiming {
        self.timing
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Mark the hook as officially associated with its statement.
    pub fn attach(&self) {
        self.attached.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Prepare calls still allowed to check for a missing key.
    #[must_use]
    pub fn remaining_prepares(&self) -> usize {
        self.concurrency
            .saturating_sub(self.prepared.load(Ordering::Relaxed))
    }

    /// Write-path hook, run before the write executes.
    pub fn process_before(&self, parameter: &mut Parameter<'_>) -> Result<usize, InternalError> {
        match self.timing {
            KeyTiming::Before => self.generate(parameter, false),
            KeyTiming::After => Ok(0),
        }
    }

    /// Write-path hook, run after the write executes.
    pub fn process_after(&self, parameter: &mut Parameter<'_>) -> Result<usize, InternalError> {
        match self.timing {
            KeyTiming::After => self.generate(parameter, false),
            KeyTiming::Before => Ok(0),
        }
    }

    /// Self-healing pass for before-write keys.
    ///
    /// Until the hook is attached every call assigns missing keys. After
    /// that, at most `concurrency` further calls do; later ones return
    /// immediately. A caller that arrives unattached but is scheduled after
    /// the budget is spent can still miss its key, so this narrows the
    /// startup window rather than closing it.
    pub fn prepare(&self, parameter: &mut Parameter<'_>) -> Result<usize, InternalError> {
        if self.timing != KeyTiming::Before {
            return Ok(0);
        }
        if self.is_attached() {
            let admitted = self
                .prepared
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    (n < self.concurrency).then_some(n + 1)
                })
                .is_ok();
            if !admitted {
                return Ok(0);
            }
        }

        self.generate(parameter, true)
    }

    fn generate(&self, parameter: &mut Parameter<'_>, preparing: bool) -> Result<usize, InternalError> {
        let Some(column) = self.table.column(&self.column) else {
            return Err(InternalError::new(
                ErrorClass::InvariantViolation,
                ErrorOrigin::KeyGeneration,
                format!(
                    "key column '{}' missing from table '{}'",
                    self.column,
                    self.table.storage_name()
                ),
            ));
        };
        let property = column.property("");

        let mut assigned = 0;
        for target in parameter.targets() {
            if target.entity_type() != self.table.mapped_type() || target.key(&property).is_some() {
                continue;
            }
            let value = self.generator.generate(&self.table, column)?;
            target.set_key(&property, value);
            assigned += 1;
        }

        let mapped_type = self.table.mapped_type().path();
        if preparing {
            self.sink.record(MetricsEvent::KeysPrepared {
                mapped_type,
                assigned,
            });
        } else {
            self.sink.record(MetricsEvent::KeysGenerated {
                mapped_type,
                assigned,
            });
        }

        Ok(assigned)
    }
}

impl std::fmt::Debug for KeyGenerationHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyGenerationHook")
            .field("generator", &self.generator.name())
            .field("table", &self.table.storage_name())
            .field("column", &self.column)
            .field("timing", &self.timing)
            .field("concurrency", &self.concurrency)
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}
