use crate::{
    keygen::{KeyGenerationError, KeyValue},
    model::{EntityColumn, EntityTable},
    sync::lock,
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicI64, Ordering},
    },
};
use ulid::Generator;

///
/// KeyGenerator
/// Produces key values for one column of one table.
///

pub trait KeyGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(
        &self,
        table: &EntityTable,
        column: &EntityColumn,
    ) -> Result<KeyValue, KeyGenerationError>;
}

///
/// SequenceKeyGenerator
/// Process-local counter starting at 1.
///

#[derive(Debug)]
pub struct SequenceKeyGenerator {
    next: AtomicI64,
}

impl SequenceKeyGenerator {
    pub const NAME: &str = "sequence";

    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    #[must_use]
    pub const fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }
}

impl Default for SequenceKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator for SequenceKeyGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn generate(&self, _: &EntityTable, _: &EntityColumn) -> Result<KeyValue, KeyGenerationError> {
        Ok(KeyValue::Int(self.next.fetch_add(1, Ordering::Relaxed)))
    }
}

///
/// UlidKeyGenerator
///
/// Monotonic ULIDs; within one millisecond the random part increments so
/// keys stay ordered.
///

pub struct UlidKeyGenerator {
    generator: Mutex<Generator>,
}

impl UlidKeyGenerator {
    pub const NAME: &str = "ulid";

    #[must_use]
    pub fn new() -> Self {
        Self {
            generator: Mutex::new(Generator::new()),
        }
    }
}

impl Default for UlidKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UlidKeyGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UlidKeyGenerator").finish_non_exhaustive()
    }
}

impl KeyGenerator for UlidKeyGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn generate(&self, _: &EntityTable, _: &EntityColumn) -> Result<KeyValue, KeyGenerationError> {
        let ulid = lock(&self.generator)
            .generate()
            .map_err(|err| KeyGenerationError::GeneratorFailed {
                name: Self::NAME.to_string(),
                message: err.to_string(),
            })?;

        Ok(KeyValue::Text(ulid.to_string()))
    }
}

///
/// KeyGeneratorRegistry
///

#[derive(Clone)]
pub struct KeyGeneratorRegistry {
    generators: HashMap<String, Arc<dyn KeyGenerator>>,
}

impl KeyGeneratorRegistry {
    /// Registry holding the `sequence` and `ulid` generators.
    #[must_use]
    pub fn new() -> Self {
        Self::empty()
            .with(Arc::new(SequenceKeyGenerator::new()))
            .with(Arc::new(UlidKeyGenerator::new()))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, generator: Arc<dyn KeyGenerator>) -> Self {
        self.register(generator);
        self
    }

    pub fn register(&mut self, generator: Arc<dyn KeyGenerator>) {
        self.generators
            .insert(generator.name().to_string(), generator);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn KeyGenerator>, KeyGenerationError> {
        self.generators
            .get(name)
            .cloned()
            .ok_or_else(|| KeyGenerationError::UnknownGenerator {
                name: name.to_string(),
            })
    }
}

impl Default for KeyGeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeyGeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.generators.keys().collect();
        names.sort_unstable();
        f.debug_struct("KeyGeneratorRegistry")
            .field("generators", &names)
            .finish()
    }
}
