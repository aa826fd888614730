//! Module: style
//! Responsibility: naming styles that map identifiers to storage names.
//!
//! A [`StyleRegistry`] owns the named styles. The process default is read
//! from configuration on first use and then latched; later configuration
//! changes do not affect it.


use crate::{
    error::{ErrorClass, ErrorDetail, ErrorOrigin, InternalError},
    model::{Attribute, EntityTable, TypeRef},
};
use convert_case::{Case, Casing};
use entimap_config::{PropertySource, keys};
use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
};
use thiserror::Error as ThisError;

pub const NORMAL: &str = "normal";
pub const LOWER: &str = "lower";
pub const UPPER: &str = "upper";
pub const LOWER_UNDERSCORE: &str = "lower_underscore";
pub const UPPER_UNDERSCORE: &str = "upper_underscore";
pub const SNAKE: &str = "snake";
pub const UPPER_SNAKE: &str = "upper_snake";

///
/// StyleError
///

#[derive(Debug, ThisError)]
pub enum StyleError {
    #[error("unknown naming style '{name}'")]
    UnknownStyle { name: String },
}

impl From<StyleError> for InternalError {
    fn from(err: StyleError) -> Self {
        Self::classified(
            ErrorClass::Configuration,
            ErrorOrigin::Style,
            ErrorDetail::Style(err),
        )
    }
}

///
/// NamingStyle
///
/// Pure identifier transform. `table_name` and `column_name` default to
/// converting the type's simple name and the attribute name.
///

pub trait NamingStyle: Send + Sync {
    fn name(&self) -> &str;

    fn convert(&self, raw: &str) -> String;

    fn table_name(&self, ty: &TypeRef) -> String {
        self.convert(ty.simple_name())
    }

    fn column_name(&self, _table: &EntityTable, attribute: &Attribute) -> String {
        self.convert(attribute.name())
    }
}

///
/// BuiltinStyle
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuiltinStyle {
    Normal,
    Lower,
    Upper,
    LowerUnderscore,
    UpperUnderscore,
}

impl BuiltinStyle {
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Lower,
        Self::Upper,
        Self::LowerUnderscore,
        Self::UpperUnderscore,
    ];
}

impl NamingStyle for BuiltinStyle {
    fn name(&self) -> &str {
        match self {
            Self::Normal => NORMAL,
            Self::Lower => LOWER,
            Self::Upper => UPPER,
            Self::LowerUnderscore => LOWER_UNDERSCORE,
            Self::UpperUnderscore => UPPER_UNDERSCORE,
        }
    }

    fn convert(&self, raw: &str) -> String {
        match self {
            Self::Normal => raw.to_string(),
            Self::Lower => raw.to_lowercase(),
            Self::Upper => raw.to_uppercase(),
            Self::LowerUnderscore => underscore(raw),
            Self::UpperUnderscore => underscore(raw).to_uppercase(),
        }
    }
}

// Underscore before every uppercase letter; digits never start a word.
fn underscore(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    for ch in raw.chars() {
        if ch.is_uppercase() {
            out.push('_');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }

    match out.strip_prefix('_') {
        Some(rest) => rest.to_string(),
        None => out,
    }
}

///
/// WordCaseStyle
///
/// Word-boundary aware snake casing: acronyms stay one word
/// (`HTTPServer` → `http_server`).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WordCaseStyle {
    upper: bool,
}

impl WordCaseStyle {
    #[must_use]
    pub const fn snake() -> Self {
        Self { upper: false }
    }

    #[must_use]
    pub const fn upper_snake() -> Self {
        Self { upper: true }
    }
}

impl NamingStyle for WordCaseStyle {
    fn name(&self) -> &str {
        if self.upper { UPPER_SNAKE } else { SNAKE }
    }

    fn convert(&self, raw: &str) -> String {
        let snake = raw.to_case(Case::Snake);
        if self.upper {
            snake.to_uppercase()
        } else {
            snake
        }
    }
}

///
/// StyleRegistry
///

pub struct StyleRegistry {
    styles: HashMap<String, Arc<dyn NamingStyle>>,
    properties: Arc<dyn PropertySource>,
    default: OnceLock<Arc<dyn NamingStyle>>,
}

impl StyleRegistry {
    /// Registry with every built-in style.
    #[must_use]
    pub fn new(properties: Arc<dyn PropertySource>) -> Self {
        let mut registry = Self {
            styles: HashMap::new(),
            properties,
            default: OnceLock::new(),
        };
        for style in BuiltinStyle::ALL {
            registry.register(Arc::new(style));
        }
        registry.register(Arc::new(WordCaseStyle::snake()));
        registry.register(Arc::new(WordCaseStyle::upper_snake()));

        registry
    }

    /// Add or replace a style under its own name.
    pub fn register(&mut self, style: Arc<dyn NamingStyle>) {
        self.styles.insert(style.name().to_string(), style);
    }

    #[must_use]
    pub fn with_style(mut self, style: Arc<dyn NamingStyle>) -> Self {
        self.register(style);
        self
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn NamingStyle>, StyleError> {
        self.styles
            .get(name)
            .cloned()
            .ok_or_else(|| StyleError::UnknownStyle {
                name: name.to_string(),
            })
    }

    /// Configured default, latched on first success. A failed lookup is not
    /// latched, so a corrected registry can still succeed later.
    pub fn default_style(&self) -> Result<Arc<dyn NamingStyle>, StyleError> {
        if let Some(style) = self.default.get() {
            return Ok(Arc::clone(style));
        }

        let name = self
            .properties
            .get_string(keys::STYLE)
            .unwrap_or_else(|| keys::DEFAULT_STYLE.to_string());
        let style = self.get(name.trim())?;
        let _ = self.default.set(Arc::clone(&style));

        Ok(self.default.get().map_or(style, Arc::clone))
    }

    /// Declared style when present, otherwise the default.
    pub fn resolve(&self, declared: Option<&str>) -> Result<Arc<dyn NamingStyle>, StyleError> {
        match declared {
            Some(name) if !name.is_empty() => self.get(name),
            _ => self.default_style(),
        }
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.styles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for StyleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleRegistry")
            .field("styles", &self.names())
            .field("default", &self.default.get().map(|s| s.name().to_string()))
            .finish_non_exhaustive()
    }
}
