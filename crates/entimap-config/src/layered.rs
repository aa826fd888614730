use crate::PropertySource;
use std::sync::Arc;

///
/// LayeredSource
/// Ordered stack of sources; the first layer holding a key wins.
///

#[derive(Clone, Default)]
pub struct LayeredSource {
    layers: Vec<Arc<dyn PropertySource>>,
}

impl LayeredSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-precedence layer.
    #[must_use]
    pub fn layer(mut self, source: impl PropertySource + 'static) -> Self {
        self.layers.push(Arc::new(source));
        self
    }

    /// Append an already shared lower-precedence layer.
    #[must_use]
    pub fn shared_layer(mut self, source: Arc<dyn PropertySource>) -> Self {
        self.layers.push(source);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl PropertySource for LayeredSource {
    fn get_string(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get_string(key))
    }
}
