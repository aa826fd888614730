use crate::{
    error::InternalError,
    introspect::{MethodOptions, StatementKind},
    keygen::{KeyBinding, KeyStrategyPlanner, Parameter},
    model::EntityTable,
    obs::{self, MetricsEvent, MetricsSink},
    script::SqlScript,
    settings::ProviderSettings,
    statement::{
        CacheKey, CompileContext, CompileHook, Configuration, ConfigurationId, MethodIdentity,
        ParameterShape, StatementCacheError, TemplateCompiler,
    },
    sync::{lock, read, write},
};
use entimap_config::keys;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

///
/// StatementRegistration
/// Everything needed to compile one statement later.
///

pub struct StatementRegistration {
    pub identity: MethodIdentity,
    pub table: Arc<EntityTable>,
    pub script: Arc<dyn SqlScript>,
    pub parameter: ParameterShape,
    pub kind: StatementKind,
    pub options: MethodOptions,
}

impl StatementRegistration {
    #[must_use]
    pub fn new(
        identity: MethodIdentity,
        table: Arc<EntityTable>,
        script: Arc<dyn SqlScript>,
    ) -> Self {
        Self {
            identity,
            table,
            script,
            parameter: ParameterShape::default(),
            kind: StatementKind::Select,
            options: MethodOptions::default(),
        }
    }

    #[must_use]
    pub fn parameter(mut self, parameter: ParameterShape) -> Self {
        self.parameter = parameter;
        self
    }

    #[must_use]
    pub const fn kind(mut self, kind: StatementKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn options(mut self, options: MethodOptions) -> Self {
        self.options = options;
        self
    }
}

///
/// RecordState
///

enum RecordState {
    Live {
        table: Arc<EntityTable>,
        script: Option<Arc<dyn SqlScript>>,
        template: Option<Arc<str>>,
    },

    /// Use-once mode dropped the inputs after the first compile.
    Retired,
}

///
/// StatementRecord
/// Deferred compilation inputs for one key. `state` doubles as the key's
/// compile lock.
///

struct StatementRecord {
    parameter: ParameterShape,
    kind: StatementKind,
    options: MethodOptions,
    state: Mutex<RecordState>,
}

///
/// CompiledStatement
///

pub struct CompiledStatement<A> {
    key: CacheKey,
    configuration: ConfigurationId,
    kind: StatementKind,
    template: Arc<str>,
    artifact: A,
    key_binding: KeyBinding,
}

impl<A> CompiledStatement<A> {
    #[must_use]
    pub const fn key(&self) -> &CacheKey {
        &self.key
    }

    #[must_use]
    pub const fn configuration(&self) -> ConfigurationId {
        self.configuration
    }

    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub const fn artifact(&self) -> &A {
        &self.artifact
    }

    #[must_use]
    pub const fn key_binding(&self) -> &KeyBinding {
        &self.key_binding
    }

    /// Parameter binding path; runs the key hook's self-healing prepare.
    pub fn bind(&self, parameter: &mut Parameter<'_>) -> Result<usize, InternalError> {
        match self.key_binding.hook() {
            Some(hook) => hook.prepare(parameter),
            None => Ok(0),
        }
    }

    /// Executor hook before the write.
    pub fn before_write(&self, parameter: &mut Parameter<'_>) -> Result<usize, InternalError> {
        match self.key_binding.hook() {
            Some(hook) => hook.process_before(parameter),
            None => Ok(0),
        }
    }

    /// Executor hook after the write.
    pub fn after_write(&self, parameter: &mut Parameter<'_>) -> Result<usize, InternalError> {
        match self.key_binding.hook() {
            Some(hook) => hook.process_after(parameter),
            None => Ok(0),
        }
    }
}

impl<A> std::fmt::Debug for CompiledStatement<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledStatement")
            .field("key", &self.key)
            .field("configuration", &self.configuration)
            .field("kind", &self.kind)
            .field("key_binding", &self.key_binding)
            .finish_non_exhaustive()
    }
}

type CompiledMap<A> = HashMap<ConfigurationId, HashMap<CacheKey, Arc<CompiledStatement<A>>>>;

///
/// StatementCache
///
/// Owns every registered statement and its compiled artifacts. Locking is
/// per key: the record map and artifact map are only held for lookups and
/// inserts, never across rendering or compilation.
///

pub struct StatementCache<C: TemplateCompiler> {
    compiler: C,
    records: RwLock<HashMap<CacheKey, Arc<StatementRecord>>>,
    compiled: RwLock<CompiledMap<C::Artifact>>,
    hooks: Vec<Arc<dyn CompileHook<C::Artifact>>>,
    planner: KeyStrategyPlanner,
    use_once: bool,
    sink: Arc<dyn MetricsSink>,
}

impl<C: TemplateCompiler> StatementCache<C> {
    #[must_use]
    pub fn new(compiler: C) -> Self {
        let capacity = usize::try_from(keys::DEFAULT_STATEMENT_CACHE_INITIAL_CAPACITY).unwrap_or(0);

        Self {
            compiler,
            records: RwLock::new(HashMap::with_capacity(capacity)),
            compiled: RwLock::new(HashMap::new()),
            hooks: Vec::new(),
            planner: KeyStrategyPlanner::default(),
            use_once: keys::DEFAULT_STATEMENT_CACHE_USE_ONCE,
            sink: obs::noop(),
        }
    }

    /// Cache sized and moded from settings.
    #[must_use]
    pub fn configured(compiler: C, settings: &ProviderSettings) -> Self {
        Self::new(compiler)
            .with_capacity(settings.initial_capacity)
            .with_use_once(settings.use_once)
            .with_planner(KeyStrategyPlanner::default().with_concurrency(settings.key_concurrency))
    }

    #[must_use]
    pub fn with_capacity(self, capacity: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::with_capacity(capacity)),
            ..self
        }
    }

    /// Retire each record after its first compile.
    ///
    /// Frees the table and template, but any later compile for a different
    /// configuration fails with a stale-entry error. Only enable when a
    /// single configuration will ever exist.
    #[must_use]
    pub const fn with_use_once(mut self, use_once: bool) -> Self {
        self.use_once = use_once;
        self
    }

    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn CompileHook<C::Artifact>>) -> Self {
        self.hooks.push(hook);
        self
    }

    #[must_use]
    pub fn with_planner(mut self, planner: KeyStrategyPlanner) -> Self {
        self.planner = planner;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub const fn compiler(&self) -> &C {
        &self.compiler
    }

    #[must_use]
    pub const fn is_use_once(&self) -> bool {
        self.use_once
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a select-style statement with default options.
    pub fn register(
        &self,
        identity: &MethodIdentity,
        table: Arc<EntityTable>,
        script: Arc<dyn SqlScript>,
    ) -> CacheKey {
        self.register_statement(StatementRegistration::new(identity.clone(), table, script))
    }

    /// Register a statement; the first registration for a key wins and
    /// later ones return the same key without touching the record.
    pub fn register_statement(&self, registration: StatementRegistration) -> CacheKey {
        let key = registration.identity.key();
        let mut records = write(&self.records);

        if records.contains_key(&key) {
            self.sink
                .record(MetricsEvent::StatementDuplicate { key: key.as_str() });
            return key;
        }

        records.insert(
            key.clone(),
            Arc::new(StatementRecord {
                parameter: registration.parameter,
                kind: registration.kind,
                options: registration.options,
                state: Mutex::new(RecordState::Live {
                    table: registration.table,
                    script: Some(registration.script),
                    template: None,
                }),
            }),
        );
        self.sink
            .record(MetricsEvent::StatementRegistered { key: key.as_str() });

        key
    }

    #[must_use]
    pub fn is_registered(&self, key: &CacheKey) -> bool {
        read(&self.records).contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.records).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        read(&self.records).is_empty()
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    /// Compiled statement for `key` under `configuration`, compiling it on
    /// first use. Concurrent first callers for the same key serialize on
    /// the key's lock; the loser of the race reuses the winner's artifact.
    pub fn compile(
        &self,
        configuration: &Configuration,
        key: &CacheKey,
    ) -> Result<Arc<CompiledStatement<C::Artifact>>, InternalError> {
        if let Some(hit) = self.lookup(configuration.id(), key) {
            return Ok(hit);
        }

        let record = read(&self.records)
            .get(key)
            .cloned()
            .ok_or_else(|| StatementCacheError::NotRegistered { key: key.clone() })?;
        let mut state = lock(&record.state);

        if let Some(hit) = self.lookup(configuration.id(), key) {
            return Ok(hit);
        }

        let RecordState::Live {
            table,
            script,
            template,
        } = &mut *state
        else {
            return Err(StatementCacheError::StaleCacheEntry {
                key: key.clone(),
                configuration: configuration.to_string(),
            }
            .into());
        };

        let text = match template.clone() {
            Some(text) => text,
            None => {
                let rendered = script.as_ref().map(|s| s.sql(table)).ok_or_else(|| {
                    InternalError::statement_invariant(format!(
                        "statement '{key}' has neither a template nor a script"
                    ))
                })?;
                let text: Arc<str> = Arc::from(rendered);
                *template = Some(Arc::clone(&text));
                *script = None;
                self.sink
                    .record(MetricsEvent::TemplateRendered { key: key.as_str() });
                log::trace!("{key}:\n{text}");
                text
            }
        };

        let compiled = match self.build(configuration, key, &record, table, &text) {
            Ok(compiled) => Arc::new(compiled),
            Err(err) => {
                self.sink
                    .record(MetricsEvent::CompileFailed { key: key.as_str() });
                return Err(err);
            }
        };

        write(&self.compiled)
            .entry(configuration.id())
            .or_default()
            .insert(key.clone(), Arc::clone(&compiled));
        if let Some(hook) = compiled.key_binding().hook() {
            hook.attach();
        }
        self.sink.record(MetricsEvent::CompileComplete {
            key: key.as_str(),
            configuration: configuration.id().get(),
        });
        log::debug!("compiled statement {key} for {configuration}");

        if self.use_once {
            *state = RecordState::Retired;
            self.sink
                .record(MetricsEvent::StatementRetired { key: key.as_str() });
        }

        Ok(compiled)
    }

    /// Already-compiled statement, without compiling.
    #[must_use]
    pub fn compiled(
        &self,
        configuration: &Configuration,
        key: &CacheKey,
    ) -> Option<Arc<CompiledStatement<C::Artifact>>> {
        read(&self.compiled)
            .get(&configuration.id())
            .and_then(|by_key| by_key.get(key).cloned())
    }

    /// Number of statements compiled for `configuration`.
    #[must_use]
    pub fn compiled_len(&self, configuration: &Configuration) -> usize {
        read(&self.compiled)
            .get(&configuration.id())
            .map_or(0, HashMap::len)
    }

    /// Drop every artifact compiled for `configuration`. Records stay, so
    /// a live record can be compiled again.
    pub fn release(&self, configuration: &Configuration) -> usize {
        write(&self.compiled)
            .remove(&configuration.id())
            .map_or(0, |by_key| by_key.len())
    }

    fn lookup(
        &self,
        configuration: ConfigurationId,
        key: &CacheKey,
    ) -> Option<Arc<CompiledStatement<C::Artifact>>> {
        let hit = read(&self.compiled)
            .get(&configuration)
            .and_then(|by_key| by_key.get(key).cloned());
        if hit.is_some() {
            self.sink
                .record(MetricsEvent::CompileHit { key: key.as_str() });
        }

        hit
    }

    fn build(
        &self,
        configuration: &Configuration,
        key: &CacheKey,
        record: &StatementRecord,
        table: &Arc<EntityTable>,
        text: &Arc<str>,
    ) -> Result<CompiledStatement<C::Artifact>, InternalError> {
        // A planning error must not run any hook or the compiler.
        let key_binding = self
            .planner
            .plan(key.as_str(), table, record.kind, &record.options)?;
        let cx = CompileContext {
            key,
            configuration,
            table,
            template: text,
            kind: record.kind,
        };

        for hook in &self.hooks {
            hook.before_compile(&cx)?;
        }
        let mut artifact = self
            .compiler
            .compile(configuration, text, &record.parameter)
            .map_err(|source| StatementCacheError::Compile {
                key: key.clone(),
                source,
            })?;
        for hook in &self.hooks {
            artifact = hook.after_compile(&cx, artifact)?;
        }

        Ok(CompiledStatement {
            key: key.clone(),
            configuration: configuration.id(),
            kind: record.kind,
            template: Arc::clone(text),
            artifact,
            key_binding,
        })
    }
}

impl<C: TemplateCompiler> std::fmt::Debug for StatementCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementCache")
            .field("records", &self.len())
            .field("hooks", &self.hooks.len())
            .field("use_once", &self.use_once)
            .finish_non_exhaustive()
    }
}
