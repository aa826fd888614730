//! Property sources consulted by the entimap runtime.
//!
//! Every source answers dotted keys (`entimap.style`) with optional string
//! values; typed accessors fall back to a caller-supplied default when the
//! key is missing or the stored value does not parse.

mod env;
mod layered;
mod map;
mod toml_source;

pub mod keys;

#[cfg(test)]
mod tests;

pub use env::EnvSource;
pub use layered::LayeredSource;
pub use map::MapSource;
pub use toml_source::TomlSource;

use std::{io, path::PathBuf, sync::Arc};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for config key '{key}'")]
    InvalidValue { key: String, value: String },
}

///
/// PropertySource
///
/// Read-only key/value lookup. Implementations must be cheap to query and
/// safe to share across threads.
///

pub trait PropertySource: Send + Sync {
    /// Raw string value for `key`, if present.
    fn get_string(&self, key: &str) -> Option<String>;

    /// Integer value for `key`, or `default` when absent or malformed.
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_string(key)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Boolean value for `key`, or `default` when absent or malformed.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_string(key)
            .and_then(|value| parse_bool(&value))
            .unwrap_or(default)
    }

    /// Strict integer lookup that reports malformed values.
    fn try_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        match self.get_string(key) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value,
                }),
        }
    }
}

impl<T: PropertySource + ?Sized> PropertySource for Arc<T> {
    fn get_string(&self, key: &str) -> Option<String> {
        (**self).get_string(key)
    }
}

impl<T: PropertySource + ?Sized> PropertySource for &T {
    fn get_string(&self, key: &str) -> Option<String> {
        (**self).get_string(key)
    }
}

/// Parses the boolean spellings commonly found in property files.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
