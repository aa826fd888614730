//! Runtime settings read once from a property source.

use entimap_config::{PropertySource, keys};
use serde::{Deserialize, Serialize};

///
/// ProviderSettings
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Default naming style name.
    pub style: String,

    /// Initial capacity of the statement record map.
    pub initial_capacity: usize,

    /// Retire statement records after their first compile.
    pub use_once: bool,

    /// Post-attach prepare budget for before-write key generators.
    pub key_concurrency: usize,
}

impl ProviderSettings {
    /// Read every setting; malformed or negative values take the default.
    #[must_use]
    pub fn from_source(source: &dyn PropertySource) -> Self {
        let defaults = Self::default();

        Self {
            style: source
                .get_string(keys::STYLE)
                .map_or(defaults.style, |s| s.trim().to_string()),
            initial_capacity: read_usize(
                source,
                keys::STATEMENT_CACHE_INITIAL_CAPACITY,
                defaults.initial_capacity,
            ),
            use_once: source.get_bool(keys::STATEMENT_CACHE_USE_ONCE, defaults.use_once),
            key_concurrency: read_usize(
                source,
                keys::KEY_GENERATOR_CONCURRENCY,
                defaults.key_concurrency,
            ),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            style: keys::DEFAULT_STYLE.to_string(),
            initial_capacity: to_usize(keys::DEFAULT_STATEMENT_CACHE_INITIAL_CAPACITY),
            use_once: keys::DEFAULT_STATEMENT_CACHE_USE_ONCE,
            key_concurrency: to_usize(keys::DEFAULT_KEY_GENERATOR_CONCURRENCY),
        }
    }
}

fn read_usize(source: &dyn PropertySource, key: &str, default: usize) -> usize {
    source
        .try_int(key)
        .ok()
        .flatten()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(default)
}

fn to_usize(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entimap_config::MapSource;

    #[test]
    fn defaults_apply_when_unset() {
        let settings = ProviderSettings::from_source(&MapSource::new());

        assert_eq!(settings, ProviderSettings::default());
        assert_eq!(settings.style, "lower_underscore");
        assert_eq!(settings.initial_capacity, 1024);
        assert!(!settings.use_once);
        assert_eq!(settings.key_concurrency, 1000);
    }

    #[test]
    fn values_are_read_and_bad_ones_ignored() {
        let source = MapSource::new()
            .with(keys::STYLE, " upper ")
            .with(keys::STATEMENT_CACHE_INITIAL_CAPACITY, "16")
            .with(keys::STATEMENT_CACHE_USE_ONCE, "yes")
            .with(keys::KEY_GENERATOR_CONCURRENCY, "-3");
        let settings = ProviderSettings::from_source(&source);

        assert_eq!(settings.style, "upper");
        assert_eq!(settings.initial_capacity, 16);
        assert!(settings.use_once);
        assert_eq!(settings.key_concurrency, 1000);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: ProviderSettings =
            serde_json::from_str(r#"{ "use_once": true }"#).unwrap();

        assert!(settings.use_once);
        assert_eq!(settings.key_concurrency, 1000);
    }
}
