use crate::PropertySource;
use std::env;

///
/// EnvSource
///
/// Maps dotted keys onto environment variables: `entimap.style` with prefix
/// `APP` reads `APP_ENTIMAP_STYLE`. Without a prefix the bare upper-snake
/// name is used.
///

#[derive(Clone, Debug, Default)]
pub struct EnvSource {
    prefix: Option<String>,
}

impl EnvSource {
    #[must_use]
    pub const fn new() -> Self {
        Self { prefix: None }
    }

    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Environment variable name consulted for `key`.
    #[must_use]
    pub fn var_name(&self, key: &str) -> String {
        let body: String = key
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        match &self.prefix {
            Some(prefix) => format!("{}_{body}", prefix.to_ascii_uppercase()),
            None => body,
        }
    }
}

impl PropertySource for EnvSource {
    fn get_string(&self, key: &str) -> Option<String> {
        env::var(self.var_name(key)).ok()
    }
}
