use crate::{
    error::InternalError,
    introspect::StatementKind,
    model::{EntityTable, TypeRef, TypeShape},
    statement::{CacheKey, Configuration},
};
use thiserror::Error as ThisError;

///
/// ParameterShape
/// What the compiled statement will be invoked with.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParameterShape {
    pub entity: Option<TypeRef>,
    pub params: Vec<TypeShape>,
}

///
/// CompileError
/// Failure reported by the template compiler.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct CompileError {
    message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

///
/// TemplateCompiler
///
/// Turns rendered template text into an executable artifact for one
/// configuration. Expensive; the statement cache calls it at most once per
/// (key, configuration).
///

pub trait TemplateCompiler: Send + Sync {
    type Artifact: Send + Sync + 'static;

    fn compile(
        &self,
        configuration: &Configuration,
        template: &str,
        parameter: &ParameterShape,
    ) -> Result<Self::Artifact, CompileError>;
}

///
/// CompileContext
///

#[derive(Clone, Copy, Debug)]
pub struct CompileContext<'a> {
    pub key: &'a CacheKey,
    pub configuration: &'a Configuration,
    pub table: &'a EntityTable,
    pub template: &'a str,
    pub kind: StatementKind,
}

///
/// CompileHook
///
/// Runs inside the per-key compile lock, in registration order. Any error
/// aborts the compile and nothing is published.
///

pub trait CompileHook<A>: Send + Sync {
    /// Runtime-context initialisation before the compiler runs.
    fn before_compile(&self, _cx: &CompileContext<'_>) -> Result<(), InternalError> {
        Ok(())
    }

    /// Customise the freshly compiled artifact.
    fn after_compile(&self, _cx: &CompileContext<'_>, artifact: A) -> Result<A, InternalError> {
        Ok(artifact)
    }
}
