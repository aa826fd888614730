//! Module: provider
//! Responsibility: own every cache and run the mapper-method control flow
//! (finder -> metadata -> statement cache).

use entimap_config::{MapSource, PropertySource};
use entimap_core::{
    InternalError,
    chain::ResolutionChain,
    finder::{EntityClassFinder, FinderError},
    introspect::{Introspect, MethodDescriptor},
    keygen::{KeyGenerator, KeyGeneratorRegistry, KeyStrategyPlanner},
    metadata::EntityMetadataCache,
    model::{EntityTable, TypeRef},
    obs::{self, MetricsSink},
    script::{ScriptContext, ScriptWrapper, ScriptWrappers, SqlScript, wrap_script},
    settings::ProviderSettings,
    statement::{
        CacheKey, CompileHook, CompiledStatement, Configuration, MethodIdentity, ParameterShape,
        StatementCache, StatementRegistration, TemplateCompiler,
    },
    style::{NamingStyle, StyleRegistry},
};
use std::sync::Arc;

///
/// Provider
///
/// Entry point for a mapper runtime. Resolves the entity behind a mapper
/// method, registers its template script, and compiles it per runtime
/// configuration. All caches live here; nothing is process-global.
///

pub struct Provider<C: TemplateCompiler> {
    settings: ProviderSettings,
    catalog: Arc<dyn Introspect>,
    finder: EntityClassFinder,
    metadata: EntityMetadataCache,
    statements: StatementCache<C>,
    wrappers: ScriptWrappers,
}

impl<C: TemplateCompiler> Provider<C> {
    #[must_use]
    pub fn builder(catalog: Arc<dyn Introspect>, compiler: C) -> ProviderBuilder<C> {
        ProviderBuilder::new(catalog, compiler)
    }

    #[must_use]
    pub const fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn Introspect {
        self.catalog.as_ref()
    }

    #[must_use]
    pub const fn finder(&self) -> &EntityClassFinder {
        &self.finder
    }

    #[must_use]
    pub const fn metadata(&self) -> &EntityMetadataCache {
        &self.metadata
    }

    #[must_use]
    pub const fn statements(&self) -> &StatementCache<C> {
        &self.statements
    }

    /// Table of the entity behind `mapper.method`.
    pub fn entity_table(&self, mapper: &TypeRef, method: &str) -> Result<Arc<EntityTable>, InternalError> {
        self.table_for(mapper, Some(method))
    }

    /// Table of the entity behind a mapper, without a method in scope.
    pub fn entity_info(&self, mapper: &TypeRef) -> Result<Arc<EntityTable>, InternalError> {
        self.table_for(mapper, None)
    }

    /// Register the script for `mapper.method` and return its cache key.
    ///
    /// Wrappers run against the resolved table first; the result is
    /// rendered inside a `<script>` envelope. Registering the same method
    /// again keeps the first script.
    pub fn register(
        &self,
        mapper: &TypeRef,
        method: &str,
        script: Arc<dyn SqlScript>,
    ) -> Result<CacheKey, InternalError> {
        let table = self.entity_table(mapper, method)?;
        let descriptor = self.method(mapper, method)?;

        let cx = ScriptContext {
            mapper,
            method,
            table: &table,
        };
        let wrapped = self.wrappers.apply(&cx, script)?;
        let enveloped: Arc<dyn SqlScript> =
            Arc::new(move |table: &EntityTable| wrap_script(&wrapped.sql(table)));

        let parameter = ParameterShape {
            entity: Some(table.mapped_type().clone()),
            params: descriptor.params.clone(),
        };
        let registration =
            StatementRegistration::new(MethodIdentity::new(mapper, method), table, enveloped)
                .parameter(parameter)
                .kind(descriptor.kind)
                .options(descriptor.options.clone());

        Ok(self.statements.register_statement(registration))
    }

    /// Compiled statement for `key`, compiling it on first use for
    /// `configuration`.
    pub fn compile(
        &self,
        configuration: &Configuration,
        key: &CacheKey,
    ) -> Result<Arc<CompiledStatement<C::Artifact>>, InternalError> {
        self.statements.compile(configuration, key)
    }

    fn table_for(&self, mapper: &TypeRef, method: Option<&str>) -> Result<Arc<EntityTable>, InternalError> {
        let entity = self.finder.require(mapper, method)?;

        self.metadata.resolve(&entity)
    }

    fn method(&self, mapper: &TypeRef, method: &str) -> Result<MethodDescriptor, InternalError> {
        let descriptor = self
            .catalog
            .mapper(mapper)
            .ok_or_else(|| FinderError::UnknownMapper {
                mapper: mapper.clone(),
            })?;

        descriptor.find_method(method).cloned().ok_or_else(|| {
            FinderError::UnknownMethod {
                mapper: mapper.clone(),
                method: method.to_string(),
            }
            .into()
        })
    }
}

impl<C: TemplateCompiler> std::fmt::Debug for Provider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("settings", &self.settings)
            .field("tables", &self.metadata.len())
            .field("statements", &self.statements.len())
            .field("wrappers", &self.wrappers)
            .finish_non_exhaustive()
    }
}

///
/// ProviderBuilder
///

pub struct ProviderBuilder<C: TemplateCompiler> {
    catalog: Arc<dyn Introspect>,
    compiler: C,
    properties: Arc<dyn PropertySource>,
    chain: Option<ResolutionChain>,
    styles: Vec<Arc<dyn NamingStyle>>,
    wrappers: ScriptWrappers,
    hooks: Vec<Arc<dyn CompileHook<C::Artifact>>>,
    generators: KeyGeneratorRegistry,
    sink: Arc<dyn MetricsSink>,
}

impl<C: TemplateCompiler> ProviderBuilder<C> {
    #[must_use]
    pub fn new(catalog: Arc<dyn Introspect>, compiler: C) -> Self {
        Self {
            catalog,
            compiler,
            properties: Arc::new(MapSource::new()),
            chain: None,
            styles: Vec::new(),
            wrappers: ScriptWrappers::new(),
            hooks: Vec::new(),
            generators: KeyGeneratorRegistry::new(),
            sink: obs::noop(),
        }
    }

    #[must_use]
    pub fn properties(mut self, properties: Arc<dyn PropertySource>) -> Self {
        self.properties = properties;
        self
    }

    /// Replace the default resolution chain.
    #[must_use]
    pub fn chain(mut self, chain: ResolutionChain) -> Self {
        self.chain = Some(chain);
        self
    }

    #[must_use]
    pub fn style(mut self, style: Arc<dyn NamingStyle>) -> Self {
        self.styles.push(style);
        self
    }

    #[must_use]
    pub fn wrapper(mut self, wrapper: Arc<dyn ScriptWrapper>) -> Self {
        self.wrappers.push(wrapper);
        self
    }

    #[must_use]
    pub fn hook(mut self, hook: Arc<dyn CompileHook<C::Artifact>>) -> Self {
        self.hooks.push(hook);
        self
    }

    #[must_use]
    pub fn generator(mut self, generator: Arc<dyn KeyGenerator>) -> Self {
        self.generators.register(generator);
        self
    }

    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Read settings once and construct every cache.
    #[must_use]
    pub fn build(self) -> Provider<C> {
        let settings = ProviderSettings::from_source(self.properties.as_ref());

        let mut styles = StyleRegistry::new(Arc::clone(&self.properties));
        for style in self.styles {
            styles.register(style);
        }

        let metadata = EntityMetadataCache::new(
            Arc::clone(&self.catalog),
            Arc::new(styles),
            Arc::clone(&self.properties),
            self.chain.unwrap_or_default(),
        )
        .with_sink(Arc::clone(&self.sink));
        let finder =
            EntityClassFinder::new(Arc::clone(&self.catalog)).with_sink(Arc::clone(&self.sink));
        let planner = KeyStrategyPlanner::new(self.generators)
            .with_concurrency(settings.key_concurrency)
            .with_sink(Arc::clone(&self.sink));

        let mut statements = StatementCache::configured(self.compiler, &settings)
            .with_planner(planner)
            .with_sink(Arc::clone(&self.sink));
        for hook in self.hooks {
            statements = statements.with_hook(hook);
        }

        log::debug!(
            "provider ready: style={}, use_once={}, key_concurrency={}",
            settings.style,
            settings.use_once,
            settings.key_concurrency
        );

        Provider {
            settings,
            catalog: self.catalog,
            finder,
            metadata,
            statements,
            wrappers: self.wrappers,
        }
    }
}
