use crate::{error::InternalError, model::EntityTable, model::TypeRef, script::SqlScript};
use std::sync::Arc;

///
/// ScriptContext
/// The statement a script is being registered for.
///

#[derive(Clone, Copy, Debug)]
pub struct ScriptContext<'a> {
    pub mapper: &'a TypeRef,
    pub method: &'a str,
    pub table: &'a EntityTable,
}

///
/// ScriptWrapper
/// Rewrites a script before it is registered.
///

pub trait ScriptWrapper: Send + Sync {
    /// Higher wraps first.
    fn priority(&self) -> i32 {
        0
    }

    fn wrap(
        &self,
        cx: &ScriptContext<'_>,
        script: Arc<dyn SqlScript>,
    ) -> Result<Arc<dyn SqlScript>, InternalError>;
}

///
/// ScriptWrappers
/// Ordered wrapper list; ties keep insertion order.
///

#[derive(Clone, Default)]
pub struct ScriptWrappers {
    wrappers: Vec<Arc<dyn ScriptWrapper>>,
}

impl ScriptWrappers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, wrapper: Arc<dyn ScriptWrapper>) -> Self {
        self.push(wrapper);
        self
    }

    pub fn push(&mut self, wrapper: Arc<dyn ScriptWrapper>) {
        self.wrappers.push(wrapper);
        self.wrappers
            .sort_by_key(|w| std::cmp::Reverse(w.priority()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Run every wrapper in order, each wrapping the previous result.
    pub fn apply(
        &self,
        cx: &ScriptContext<'_>,
        script: Arc<dyn SqlScript>,
    ) -> Result<Arc<dyn SqlScript>, InternalError> {
        self.wrappers
            .iter()
            .try_fold(script, |script, wrapper| wrapper.wrap(cx, script))
    }
}

impl std::fmt::Debug for ScriptWrappers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptWrappers")
            .field("wrappers", &self.wrappers.len())
            .finish()
    }
}
