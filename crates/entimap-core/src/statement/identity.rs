use crate::model::TypeRef;
use derive_more::Display;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

///
/// MethodIdentity
/// A mapper type and one of its methods.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MethodIdentity {
    pub mapper: TypeRef,
    pub method: String,
}

impl MethodIdentity {
    #[must_use]
    pub fn new(mapper: impl Into<TypeRef>, method: impl Into<String>) -> Self {
        Self {
            mapper: mapper.into(),
            method: method.into(),
        }
    }

    /// Canonical `mapper.method` key.
    #[must_use]
    pub fn key(&self) -> CacheKey {
        CacheKey::new(format!("{}.{}", self.mapper.path(), self.method))
    }
}

///
/// CacheKey
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CacheKey(Arc<str>);

impl CacheKey {
    #[must_use]
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<&MethodIdentity> for CacheKey {
    fn from(identity: &MethodIdentity) -> Self {
        identity.key()
    }
}

///
/// ConfigurationId
/// Process-unique id; never reused.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConfigurationId(u64);

impl ConfigurationId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);

        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

///
/// Configuration
///
/// One runtime execution context. Compiled artifacts are partitioned by
/// its id; clones share the id and therefore the artifacts.
///

#[derive(Clone, Debug, Display)]
#[display("{name}#{id}")]
pub struct Configuration {
    id: ConfigurationId,
    name: Arc<str>,
}

impl Configuration {
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            id: ConfigurationId::next(),
            name: Arc::from(name.as_ref()),
        }
    }

    #[must_use]
    pub const fn id(&self) -> ConfigurationId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Configuration {}
