use crate::{
    finder::FinderError, keygen::KeyGenerationError, metadata::MetadataError,
    statement::StatementCacheError, style::StyleError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// Every fatal condition surfaces synchronously as one of these; none are
/// retried automatically.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an error without structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an error carrying a typed detail; the message mirrors it.
    pub(crate) fn classified(class: ErrorClass, origin: ErrorOrigin, detail: ErrorDetail) -> Self {
        Self {
            class,
            origin,
            message: detail.to_string(),
            detail: Some(detail),
        }
    }

    /// Construct a script-origin unsupported error.
    pub fn script_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Script, message)
    }

    /// Construct a statement-origin invariant violation.
    pub(crate) fn statement_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Statement,
            message,
        )
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_no_mapping_found(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Metadata(MetadataError::NoMappingFound { .. }))
        )
    }

    #[must_use]
    pub const fn is_entity_not_found(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Finder(FinderError::EntityNotFound { .. }))
        )
    }

    #[must_use]
    pub const fn is_unknown_style(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Style(StyleError::UnknownStyle { .. }))
        )
    }

    #[must_use]
    pub const fn is_stale_cache_entry(&self) -> bool {
        matches!(
            self.detail,
            Some(ErrorDetail::Statement(
                StatementCacheError::StaleCacheEntry { .. }
            ))
        )
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Style(StyleError),

    #[error("{0}")]
    Metadata(MetadataError),

    #[error("{0}")]
    Finder(FinderError),

    #[error("{0}")]
    Statement(StatementCacheError),

    #[error("{0}")]
    KeyGeneration(KeyGenerationError),
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Configuration,
    InvariantViolation,
    Unsupported,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Configuration => "configuration",
            Self::InvariantViolation => "invariant_violation",
            Self::Unsupported => "unsupported",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Which component raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Style,
    Metadata,
    Finder,
    Statement,
    KeyGeneration,
    Script,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Style => "style",
            Self::Metadata => "metadata",
            Self::Finder => "finder",
            Self::Statement => "statement",
            Self::KeyGeneration => "key_generation",
            Self::Script => "script",
        };
        write!(f, "{label}")
    }
}
