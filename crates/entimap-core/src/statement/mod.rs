//! Module: statement
//! Responsibility: register mapper statements and compile each one at most
//! once per runtime configuration.
//!
//! Registration stores a deferred record (table + script). The first
//! compile for a configuration renders the script (once per key, across all
//! configurations), runs the compile hooks and the template compiler under
//! the key's own lock, and publishes the artifact.

mod cache;
mod compiler;
mod identity;


pub use cache::{CompiledStatement, StatementCache, StatementRegistration};
pub use compiler::{CompileContext, CompileError, CompileHook, ParameterShape, TemplateCompiler};
pub use identity::{CacheKey, Configuration, ConfigurationId, MethodIdentity};

use crate::error::{ErrorClass, ErrorDetail, ErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// StatementCacheError
///

#[derive(Debug, ThisError)]
pub enum StatementCacheError {
    #[error("statement '{key}' is not registered")]
    NotRegistered { key: CacheKey },

    #[error(
        "statement '{key}' was retired after its first compile and cannot be compiled for {configuration}"
    )]
    StaleCacheEntry { key: CacheKey, configuration: String },

    #[error("failed to compile statement '{key}': {source}")]
    Compile {
        key: CacheKey,
        #[source]
        source: CompileError,
    },
}

impl StatementCacheError {
    const fn class(&self) -> ErrorClass {
        match self {
            Self::NotRegistered { .. } => ErrorClass::NotFound,
            Self::StaleCacheEntry { .. } => ErrorClass::InvariantViolation,
            Self::Compile { .. } => ErrorClass::Internal,
        }
    }
}

impl From<StatementCacheError> for InternalError {
    fn from(err: StatementCacheError) -> Self {
        Self::classified(
            err.class(),
            ErrorOrigin::Statement,
            ErrorDetail::Statement(err),
        )
    }
}
