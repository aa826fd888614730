use crate::{ConfigError, PropertySource};
use std::{collections::BTreeMap, fs, path::Path, str::FromStr};
use toml::{Table, Value};

///
/// TomlSource
///
/// Properties loaded from a TOML document. Nested tables are flattened into
/// dotted keys, so `[entimap] style = "lower"` answers `entimap.style`.
///

#[derive(Clone, Debug, Default)]
pub struct TomlSource {
    values: BTreeMap<String, String>,
}

impl TomlSource {
    /// Read and parse a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        input.parse()
    }

    /// Iterate flattened `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromStr for TomlSource {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let table: Table = toml::from_str(input)?;
        let mut values = BTreeMap::new();
        flatten("", &table, &mut values);

        Ok(Self { values })
    }
}

impl PropertySource for TomlSource {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn flatten(prefix: &str, table: &Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Table(inner) => flatten(&path, inner, out),
            other => {
                out.insert(path, scalar(other));
            }
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
