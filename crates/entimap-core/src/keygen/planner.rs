use crate::{
    error::InternalError,
    introspect::{MethodOptions, StatementKind},
    keygen::{KeyBinding, KeyGenerationError, KeyGenerationHook, KeyGeneratorRegistry},
    model::{EntityTable, KeyStrategy},
    obs::{self, MetricsSink},
};
use entimap_config::keys;
use std::sync::Arc;

///
/// KeyStrategyPlanner
///
/// Chooses the [`KeyBinding`] for an insert statement from the key
/// strategy declared on the table's id columns.
///

#[derive(Clone)]
pub struct KeyStrategyPlanner {
    generators: KeyGeneratorRegistry,
    concurrency: usize,
    sink: Arc<dyn MetricsSink>,
}

impl KeyStrategyPlanner {
    #[must_use]
    pub fn new(generators: KeyGeneratorRegistry) -> Self {
        Self {
            generators,
            concurrency: usize::try_from(keys::DEFAULT_KEY_GENERATOR_CONCURRENCY).unwrap_or(0),
            sink: obs::noop(),
        }
    }

    /// Post-attach prepare budget handed to every generator hook.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn plan(
        &self,
        key: &str,
        table: &Arc<EntityTable>,
        kind: StatementKind,
        options: &MethodOptions,
    ) -> Result<KeyBinding, InternalError> {
        if kind != StatementKind::Insert {
            return Ok(KeyBinding::None);
        }

        let declared: Vec<_> = table
            .id_columns()
            .into_iter()
            .filter_map(|c| c.declared_key_strategy().map(|s| (c, s)))
            .collect();
        let (column, strategy) = match declared.as_slice() {
            [] => return Ok(KeyBinding::None),
            [single] => *single,
            _ => {
                return Err(KeyGenerationError::MultipleKeyStrategies {
                    mapped_type: table.mapped_type().clone(),
                    columns: declared.iter().map(|(c, _)| c.column().to_string()).collect(),
                }
                .into());
            }
        };

        if options.use_generated_keys || options.select_key.is_some() {
            log::warn!(
                "{key}: method options override the key strategy declared on '{}'",
                column.column()
            );
            return Ok(KeyBinding::None);
        }

        let binding = match strategy {
            KeyStrategy::GeneratedKeys => KeyBinding::GeneratedKeys {
                property: column.property(""),
                column: column.column().to_string(),
            },
            KeyStrategy::AfterSql(sql) => KeyBinding::AfterSql {
                property: column.property(""),
                column: column.column().to_string(),
                sql: sql.clone(),
            },
            KeyStrategy::Generator { name, timing } => {
                let generator = self.generators.get(name)?;
                KeyBinding::Generator(Arc::new(KeyGenerationHook::new(
                    generator,
                    Arc::clone(table),
                    column.column(),
                    *timing,
                    self.concurrency,
                    Arc::clone(&self.sink),
                )))
            }
        };

        Ok(binding)
    }
}

impl Default for KeyStrategyPlanner {
    fn default() -> Self {
        Self::new(KeyGeneratorRegistry::new())
    }
}

impl std::fmt::Debug for KeyStrategyPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStrategyPlanner")
            .field("generators", &self.generators)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}
