use entimap_config::{PropertySource, parse_bool};
use std::collections::BTreeMap;

///
/// Props
///
/// Free-form string properties attached to a table or column. Typed reads
/// tolerate malformed values by returning the caller's default.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Props(BTreeMap<String, String>);

impl Props {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    #[must_use]
    pub fn get_int(&self, name: &str, default: i64) -> i64 {
        self.get(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        self.get(name).and_then(parse_bool).unwrap_or(default)
    }

    /// Local value, else the process-wide source under the same key.
    #[must_use]
    pub fn get_with_fallback(&self, name: &str, source: &dyn PropertySource) -> Option<String> {
        self.get(name)
            .map(str::to_string)
            .or_else(|| source.get_string(name))
    }

    #[must_use]
    pub fn get_int_with_fallback(
        &self,
        name: &str,
        source: &dyn PropertySource,
        default: i64,
    ) -> i64 {
        match self.get(name) {
            Some(_) => self.get_int(name, default),
            None => source.get_int(name, default),
        }
    }

    #[must_use]
    pub fn get_bool_with_fallback(
        &self,
        name: &str,
        source: &dyn PropertySource,
        default: bool,
    ) -> bool {
        match self.get(name) {
            Some(_) => self.get_bool(name, default),
            None => source.get_bool(name, default),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Props {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}
