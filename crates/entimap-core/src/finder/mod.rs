//! Module: finder
//! Responsibility: decide which mapped type a mapper method operates on.
//!
//! Strategies run in a fixed precedence order and the first accepted
//! candidate wins. Inferred candidates must be mapped types; explicit
//! declarations are taken as written. Results (including "nothing found")
//! are cached per (mapper, method).


use crate::{
    error::{ErrorClass, ErrorDetail, ErrorOrigin, InternalError},
    introspect::{Introspect, MapperDescriptor, MethodDescriptor},
    model::{TypeRef, TypeShape},
    obs::{self, MetricsEvent, MetricsSink},
    sync::{read, write},
};
use std::{collections::HashMap, sync::Arc, sync::RwLock};
use thiserror::Error as ThisError;

///
/// FinderError
///

#[derive(Debug, ThisError)]
pub enum FinderError {
    #[error("no mapped entity found for {mapper}{}", method_suffix(.method.as_deref()))]
    EntityNotFound {
        mapper: TypeRef,
        method: Option<String>,
    },

    #[error("unknown mapper '{mapper}'")]
    UnknownMapper { mapper: TypeRef },

    #[error("mapper '{mapper}' has no method '{method}'")]
    UnknownMethod { mapper: TypeRef, method: String },
}

fn method_suffix(method: Option<&str>) -> String {
    method.map(|m| format!(".{m}")).unwrap_or_default()
}

impl From<FinderError> for InternalError {
    fn from(err: FinderError) -> Self {
        Self::classified(
            ErrorClass::NotFound,
            ErrorOrigin::Finder,
            ErrorDetail::Finder(err),
        )
    }
}

///
/// InferenceContext
///

pub struct InferenceContext<'a> {
    pub mapper: &'a MapperDescriptor,
    pub method: Option<&'a MethodDescriptor>,
    pub is_mapped: &'a dyn Fn(&TypeRef) -> bool,
}

///
/// EntityInference
/// One way of naming the entity behind a mapper method.
///

pub trait EntityInference: Send + Sync {
    fn infer(&self, cx: &InferenceContext<'_>) -> Option<TypeRef>;
}

///
/// BuiltinInference
/// Built-in strategies, listed in precedence order.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuiltinInference {
    ExplicitMethod,
    ExplicitMapper,
    MethodReturnType,
    MethodParameters,
    DeclaringInterfaceGenerics,
    MapperGenerics,
}

impl BuiltinInference {
    pub const ALL: [Self; 6] = [
        Self::ExplicitMethod,
        Self::ExplicitMapper,
        Self::MethodReturnType,
        Self::MethodParameters,
        Self::DeclaringInterfaceGenerics,
        Self::MapperGenerics,
    ];
}

impl EntityInference for BuiltinInference {
    fn infer(&self, cx: &InferenceContext<'_>) -> Option<TypeRef> {
        let accept = cx.is_mapped;

        match self {
            Self::ExplicitMethod => cx.method.and_then(|m| m.entity.clone()),
            Self::ExplicitMapper => cx.mapper.entity.clone(),
            Self::MethodReturnType => cx.method.and_then(|m| m.return_type.find_type(accept)),
            Self::MethodParameters => cx.method.and_then(|m| TypeShape::find_in(&m.params, accept)),
            Self::DeclaringInterfaceGenerics => cx
                .method
                .and_then(|m| TypeShape::find_in(&m.declaring_generic_args, accept)),
            Self::MapperGenerics => TypeShape::find_in(&cx.mapper.generic_args, accept),
        }
    }
}

type FinderKey = (TypeRef, Option<String>);

///
/// EntityClassFinder
///

pub struct EntityClassFinder {
    catalog: Arc<dyn Introspect>,
    strategies: Vec<Arc<dyn EntityInference>>,
    cache: RwLock<HashMap<FinderKey, Option<TypeRef>>>,
    sink: Arc<dyn MetricsSink>,
}

impl EntityClassFinder {
    #[must_use]
    pub fn new(catalog: Arc<dyn Introspect>) -> Self {
        let strategies = BuiltinInference::ALL
            .into_iter()
            .map(|s| Arc::new(s) as Arc<dyn EntityInference>)
            .collect();

        Self::with_strategies(catalog, strategies)
    }

    /// Finder with a custom ordered strategy list.
    #[must_use]
    pub fn with_strategies(
        catalog: Arc<dyn Introspect>,
        strategies: Vec<Arc<dyn EntityInference>>,
    ) -> Self {
        Self {
            catalog,
            strategies,
            cache: RwLock::new(HashMap::new()),
            sink: obs::noop(),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Entity for `mapper` (and `method`, when given), or `None` when no
    /// strategy produced one.
    pub fn find(
        &self,
        mapper: &TypeRef,
        method: Option<&str>,
    ) -> Result<Option<TypeRef>, InternalError> {
        let key = (mapper.clone(), method.map(str::to_string));
        if let Some(found) = read(&self.cache).get(&key) {
            self.sink.record(MetricsEvent::FinderHit {
                mapper: mapper.path(),
            });
            return Ok(found.clone());
        }

        let descriptor = self
            .catalog
            .mapper(mapper)
            .ok_or_else(|| FinderError::UnknownMapper {
                mapper: mapper.clone(),
            })?;
        let method_descriptor = match method {
            Some(name) => Some(descriptor.find_method(name).ok_or_else(|| {
                FinderError::UnknownMethod {
                    mapper: mapper.clone(),
                    method: name.to_string(),
                }
            })?),
            None => None,
        };

        let catalog = self.catalog.as_ref();
        let is_mapped = |ty: &TypeRef| catalog.is_mapped(ty);
        let cx = InferenceContext {
            mapper: &descriptor,
            method: method_descriptor,
            is_mapped: &is_mapped,
        };
        let found = self.strategies.iter().find_map(|s| s.infer(&cx));

        self.sink.record(MetricsEvent::FinderMiss {
            mapper: mapper.path(),
        });
        let found = write(&self.cache).entry(key).or_insert(found).clone();

        Ok(found)
    }

    /// Like [`find`](Self::find), but a missing entity is an error.
    pub fn require(&self, mapper: &TypeRef, method: Option<&str>) -> Result<TypeRef, InternalError> {
        self.find(mapper, method)?.ok_or_else(|| {
            FinderError::EntityNotFound {
                mapper: mapper.clone(),
                method: method.map(str::to_string),
            }
            .into()
        })
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        read(&self.cache).len()
    }
}

impl std::fmt::Debug for EntityClassFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityClassFinder")
            .field("strategies", &self.strategies.len())
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}
