//! Module: keygen
//! Responsibility: primary-key generation around insert execution.
//!
//! A [`KeyGenerationHook`] assigns keys either before or after the write.
//! Before-write hooks also expose [`KeyGenerationHook::prepare`], a
//! self-healing pass for calls that reach the write path before the hook
//! has been attached to its compiled statement. That pass is best-effort:
//! once attached, only a bounded number of further prepare calls still
//! check for a missing key.

mod generator;
mod hook;
mod planner;

#[cfg(test)]
mod tests;

pub use generator::{KeyGenerator, KeyGeneratorRegistry, SequenceKeyGenerator, UlidKeyGenerator};
pub use hook::{KeyBinding, KeyGenerationHook};
pub use planner::KeyStrategyPlanner;

use crate::{
    error::{ErrorClass, ErrorDetail, ErrorOrigin, InternalError},
    model::TypeRef,
};
use derive_more::{Display, From};
use std::collections::HashMap;
use thiserror::Error as ThisError;

///
/// KeyGenerationError
///

#[derive(Debug, ThisError)]
pub enum KeyGenerationError {
    #[error("unknown key generator '{name}'")]
    UnknownGenerator { name: String },

    #[error("'{mapped_type}' declares key strategies on more than one column: {columns:?}")]
    MultipleKeyStrategies {
        mapped_type: TypeRef,
        columns: Vec<String>,
    },

    #[error("key generator '{name}' failed: {message}")]
    GeneratorFailed { name: String, message: String },
}

impl KeyGenerationError {
    const fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownGenerator { .. } => ErrorClass::Configuration,
            Self::MultipleKeyStrategies { .. } => ErrorClass::InvariantViolation,
            Self::GeneratorFailed { .. } => ErrorClass::Internal,
        }
    }
}

impl From<KeyGenerationError> for InternalError {
    fn from(err: KeyGenerationError) -> Self {
        Self::classified(
            err.class(),
            ErrorOrigin::KeyGeneration,
            ErrorDetail::KeyGeneration(err),
        )
    }
}

///
/// KeyValue
///

#[derive(Clone, Debug, Display, Eq, From, Hash, PartialEq)]
pub enum KeyValue {
    Int(i64),
    Text(String),
}

///
/// KeyTarget
/// A record that can receive a generated key.
///

pub trait KeyTarget {
    fn entity_type(&self) -> &TypeRef;

    fn key(&self, property: &str) -> Option<KeyValue>;

    fn set_key(&mut self, property: &str, value: KeyValue);
}

///
/// KeyedRecord
/// Minimal property map implementing [`KeyTarget`].
///

#[derive(Clone, Debug)]
pub struct KeyedRecord {
    entity: TypeRef,
    values: HashMap<String, KeyValue>,
}

impl KeyedRecord {
    #[must_use]
    pub fn new(entity: impl Into<TypeRef>) -> Self {
        Self {
            entity: entity.into(),
            values: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        self.values.insert(property.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, property: &str) -> Option<&KeyValue> {
        self.values.get(property)
    }
}

impl KeyTarget for KeyedRecord {
    fn entity_type(&self) -> &TypeRef {
        &self.entity
    }

    fn key(&self, property: &str) -> Option<KeyValue> {
        self.values.get(property).cloned()
    }

    fn set_key(&mut self, property: &str, value: KeyValue) {
        self.values.insert(property.to_string(), value);
    }
}

///
/// Parameter
/// Statement parameter as seen by key generation.
///

pub enum Parameter<'a> {
    Empty,
    Record(&'a mut dyn KeyTarget),
    Batch(Vec<&'a mut dyn KeyTarget>),
}

impl<'a> Parameter<'a> {
    pub fn targets(&mut self) -> Vec<&mut (dyn KeyTarget + 'a)> {
        match self {
            Self::Empty => Vec::new(),
            Self::Record(target) => vec![&mut **target],
            Self::Batch(targets) => targets.iter_mut().map(|t| &mut **t).collect(),
        }
    }
}

impl std::fmt::Debug for Parameter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Record(_) => f.write_str("Record"),
            Self::Batch(targets) => write!(f, "Batch({})", targets.len()),
        }
    }
}
