//! Core runtime for entimap: entity-to-table metadata resolution, the
//! compiled-statement cache, and primary-key generation timing.
//!
//! Control flow for one mapper method:
//! 1. [`finder::EntityClassFinder`] resolves the mapped type.
//! 2. [`metadata::EntityMetadataCache`] builds (once) its [`model::EntityTable`]
//!    through the [`chain::ResolutionChain`].
//! 3. [`statement::StatementCache`] renders and compiles the template (once per
//!    runtime configuration) and hands back the executable artifact.
#![warn(unreachable_pub)]

pub mod chain;
pub mod error;
pub mod finder;
pub mod introspect;
pub mod keygen;
pub mod metadata;
pub mod model;
pub mod obs;
pub mod script;
pub mod settings;
pub mod statement;
pub mod style;

mod sync;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::InternalError;

///
/// Prelude
///
/// Domain vocabulary only; caches and collaborator traits are imported from
/// their modules.
///

pub mod prelude {
    pub use crate::{
        introspect::{MapperDescriptor, MethodDescriptor, StatementKind},
        model::{
            Attribute, AttributeKind, ColumnDeclaration, Declaration, EntityColumn, EntityTable,
            OrderDirection, TableDeclaration, TypeRef, TypeShape,
        },
        statement::{CacheKey, Configuration, MethodIdentity},
    };
}
