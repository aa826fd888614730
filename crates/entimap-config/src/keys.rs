//! Well-known configuration keys and their defaults.

/// Default naming style applied when a table does not declare one.
pub const STYLE: &str = "entimap.style";

/// Initial capacity of the statement record map.
pub const STATEMENT_CACHE_INITIAL_CAPACITY: &str = "entimap.statement_cache.initial_capacity";

/// Retire statement records after their first compile.
///
/// Only safe when exactly one runtime configuration will ever compile
/// statements; a second configuration fails with a stale-entry error.
pub const STATEMENT_CACHE_USE_ONCE: &str = "entimap.statement_cache.use_once";

/// Number of self-healing prepare calls a before-write key generator runs
/// once its official hook is attached.
pub const KEY_GENERATOR_CONCURRENCY: &str = "entimap.key_generator.concurrency";

pub const DEFAULT_STYLE: &str = "lower_underscore";
pub const DEFAULT_STATEMENT_CACHE_INITIAL_CAPACITY: i64 = 1024;
pub const DEFAULT_STATEMENT_CACHE_USE_ONCE: bool = false;
pub const DEFAULT_KEY_GENERATOR_CONCURRENCY: i64 = 1000;
