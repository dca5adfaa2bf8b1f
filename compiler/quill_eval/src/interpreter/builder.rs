//! `EvaluatorBuilder` for configuring an [`Evaluator`].

use super::{EvalConfig, Evaluator};
use crate::environment::Environment;
use crate::struct_keys::StructKeyCache;
use quill_ir::{ExprArena, LineIndex, StringInterner};
use quill_value::{MemoryQuota, Value};
use std::sync::Arc;

const DEFAULT_PATH: &str = "<expr>";

/// Builder for [`Evaluator`].
///
/// ```text
/// let mut evaluator = EvaluatorBuilder::new(&parsed.arena, &interner)
///     .path("index.html")
///     .source(text)
///     .global("products", products)
///     .build();
/// let value = evaluator.eval(parsed.root)?;
/// ```
pub struct EvaluatorBuilder<'a> {
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    path: Option<Arc<str>>,
    source: Option<Arc<str>>,
    config: EvalConfig,
    struct_keys: Option<Arc<StructKeyCache>>,
    quota: Option<Arc<dyn MemoryQuota>>,
    globals: Vec<(String, Value)>,
}

impl<'a> EvaluatorBuilder<'a> {
    pub fn new(arena: &'a ExprArena, interner: &'a StringInterner) -> Self {
        EvaluatorBuilder {
            arena,
            interner,
            path: None,
            source: None,
            config: EvalConfig::default(),
            struct_keys: None,
            quota: None,
            globals: Vec::new(),
        }
    }

    /// Path reported in errors.
    #[must_use]
    pub fn path(mut self, path: impl Into<Arc<str>>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Source the arena was parsed from; enables line and column in errors.
    #[must_use]
    pub fn source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Active version for tagged struct fields. Ignored when a shared
    /// cache is supplied with [`struct_keys`](Self::struct_keys).
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn division_precision(mut self, digits: u32) -> Self {
        self.config.division_precision = digits;
        self
    }

    /// Share a struct key cache with other evaluators.
    #[must_use]
    pub fn struct_keys(mut self, cache: Arc<StructKeyCache>) -> Self {
        self.struct_keys = Some(cache);
        self
    }

    /// Report allocations to `quota`.
    #[must_use]
    pub fn quota(mut self, quota: Arc<dyn MemoryQuota>) -> Self {
        self.quota = Some(quota);
        self
    }

    #[must_use]
    pub fn global(mut self, name: impl Into<String>, value: Value) -> Self {
        self.globals.push((name.into(), value));
        self
    }

    #[must_use]
    pub fn globals<I, K>(mut self, globals: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.globals
            .extend(globals.into_iter().map(|(name, value)| (name.into(), value)));
        self
    }

    pub fn build(self) -> Evaluator<'a> {
        let mut config = self.config;
        let struct_keys = match self.struct_keys {
            Some(cache) => {
                if config.version.is_some() && config.version.as_deref() != cache.version() {
                    tracing::warn!(
                        requested = config.version.as_deref(),
                        cache = cache.version(),
                        "version differs from the shared struct key cache; using the cache's"
                    );
                }
                config.version = cache.version().map(str::to_owned);
                cache
            }
            None => Arc::new(match &config.version {
                Some(version) => StructKeyCache::with_version(version.clone()),
                None => StructKeyCache::new(),
            }),
        };

        let mut env = Environment::new(self.interner);
        for (name, value) in self.globals {
            env.define_global(self.interner.intern(&name), value);
        }

        Evaluator {
            arena: self.arena,
            interner: self.interner,
            env,
            config,
            struct_keys,
            quota: self.quota,
            path: self.path.unwrap_or_else(|| Arc::from(DEFAULT_PATH)),
            source: self.source.map(|source| {
                let index = LineIndex::new(&source);
                (source, index)
            }),
            nil: self.interner.intern("nil"),
        }
    }
}
