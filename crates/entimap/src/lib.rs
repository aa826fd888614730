//! ## Crate layout
//! - `config`: property sources and the well-known configuration keys.
//! - `core`: naming styles, the entity model, resolution chains, and the
//!   metadata, finder and statement caches.
//! - `provider`: the end-to-end wiring a mapper runtime talks to.
//!
//! The `prelude` module mirrors what integration code needs to describe
//! entities, register statements and compile them.

pub use entimap_config as config;
pub use entimap_core as core;

pub mod provider;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::InternalError;
pub use provider::{Provider, ProviderBuilder};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::{LayeredSource, MapSource, PropertySource, TomlSource},
        core::{
            InternalError,
            error::{ErrorClass, ErrorOrigin},
            introspect::{Introspect, MethodOptions, StaticCatalog, TypeDescriptor},
            keygen::{KeyValue, KeyedRecord, Parameter},
            model::{KeyStrategy, KeyTiming},
            prelude::*,
            script::{self, SqlScript},
            statement::{CompiledStatement, TemplateCompiler},
        },
        provider::{Provider, ProviderBuilder},
    };
}
