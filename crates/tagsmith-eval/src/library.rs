//! The directive registry and parsed invocations.
//!
//! [`Library`] maps tag names to [`Tag`]s. [`Library::parse`] turns one
//! invocation line (`"show items limit 5"`) into a shareable [`Node`];
//! [`Node::render`] resolves it against a context and produces output,
//! applying the silence policy from [`Config`].

use crate::config::Config;
use crate::context::Context;
use crate::data::ResolvedData;
use crate::error::{RenderError, ValidationError};
use crate::expression::FilterCompiler;
use crate::tag::Tag;
use lru::LruCache;
use rayon::ThreadPool;
use rayon::prelude::*;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tagsmith_syntax::{BoundArgs, Compiler, Lookup, SyntaxError, TokenTree, bind, tokenize};
use tracing::{debug, warn};

type ParseCache = Mutex<LruCache<String, Arc<Node>>>;

pub struct Library {
    tags: HashMap<String, Arc<Tag>>,
    compiler: Arc<dyn Compiler>,
    config: Arc<Config>,
    cache: Option<ParseCache>,
    pool: Option<Arc<ThreadPool>>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let cache = NonZeroUsize::new(config.parse_cache_size).map(|n| Mutex::new(LruCache::new(n)));
        let pool = build_pool(config.parallel_threads);
        Self {
            tags: HashMap::new(),
            compiler: Arc::new(FilterCompiler),
            config: Arc::new(config),
            cache,
            pool,
        }
    }

    /// Replaces the compile capability used for deferred values.
    pub fn with_compiler(mut self, compiler: impl Compiler + 'static) -> Self {
        self.compiler = Arc::new(compiler);
        self.clear_cache();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The dedicated pool for [`Node::render_each`], if one was configured.
    pub fn thread_pool(&self) -> Option<&Arc<ThreadPool>> {
        self.pool.as_ref()
    }

    /// Makes `tag` reachable by its name, replacing any tag of that name.
    pub fn register(&mut self, tag: Tag) -> Arc<Tag> {
        let tag = Arc::new(tag);
        let name = tag.name().to_string();
        if self.tags.insert(name.clone(), Arc::clone(&tag)).is_some() {
            debug!(tag = %name, "replaced registered tag");
        } else {
            debug!(tag = %name, "registered tag");
        }
        self.clear_cache();
        tag
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Tag>> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Registered tags sorted by name.
    pub fn tags(&self) -> Vec<&Arc<Tag>> {
        let mut tags: Vec<_> = self.tags.values().collect();
        tags.sort_by(|a, b| a.name().cmp(b.name()));
        tags
    }

    /// Parses one invocation line: the tag name followed by its arguments.
    ///
    /// Spans in returned errors are relative to `line`.
    pub fn parse(&self, line: &str) -> Result<Arc<Node>, SyntaxError> {
        if let Some(node) = self.cached(line) {
            debug!(line, "parse cache hit");
            return Ok(node);
        }

        let mut trees = tokenize(line);
        let name = match trees.next() {
            Some(TokenTree::Single(token)) => token.text,
            Some(group @ TokenTree::Group(_)) => {
                return Err(SyntaxError::UnknownTag { name: group.text() });
            }
            None => return Err(SyntaxError::EmptyInvocation),
        };
        let Some(tag) = self.tags.get(&name) else {
            return Err(SyntaxError::UnknownTag { name });
        };

        let bound = bind(tag.schema(), trees, self.compiler.as_ref())?;
        let node = Arc::new(Node {
            tag: Arc::clone(tag),
            bound,
            config: Arc::clone(&self.config),
            pool: self.pool.clone(),
        });

        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.lock() {
                cache.put(line.to_string(), Arc::clone(&node));
            }
        }
        Ok(node)
    }

    /// Parses and renders `line` in one step.
    pub fn render(&self, line: &str, context: &mut Context) -> Result<String, RenderError> {
        self.parse(line)?.render(context)
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.lock() {
                cache.clear();
            }
        }
    }

    fn cached(&self, line: &str) -> Option<Arc<Node>> {
        let mut cache = self.cache.as_ref()?.lock().ok()?;
        cache.get(line).cloned()
    }
}

/// One parsed invocation. Immutable; render it any number of times,
/// concurrently, against different contexts.
#[derive(Debug)]
pub struct Node {
    tag: Arc<Tag>,
    bound: BoundArgs,
    config: Arc<Config>,
    pool: Option<Arc<ThreadPool>>,
}

impl Node {
    pub fn tag(&self) -> &Arc<Tag> {
        &self.tag
    }

    pub fn bound(&self) -> &BoundArgs {
        &self.bound
    }

    pub fn thread_pool(&self) -> Option<&Arc<ThreadPool>> {
        self.pool.as_ref()
    }

    /// Whether silenceable failures become placeholder output.
    pub fn silences_errors(&self) -> bool {
        self.tag
            .silence_errors()
            .unwrap_or(self.config.silence_errors)
    }

    /// Resolves and cleans the bound arguments against `context`.
    pub fn resolve(&self, context: &dyn Lookup) -> Result<ResolvedData, ValidationError> {
        self.tag
            .resolve(&self.bound, context, self.config.strict_variables)
    }

    pub fn render(&self, context: &mut Context) -> Result<String, RenderError> {
        match self.render_unsilenced(context) {
            Err(err) if err.is_silenceable() && self.silences_errors() => {
                warn!(tag = self.tag.name(), error = %err, "silenced render error");
                Ok(self.config.invalid_placeholder.clone())
            }
            result => result,
        }
    }

    /// Renders against every context in parallel, results in input order.
    pub fn render_each(&self, contexts: &mut [Context]) -> Vec<Result<String, RenderError>> {
        let mut render_all = || -> Vec<Result<String, RenderError>> {
            contexts
                .par_iter_mut()
                .map(|ctx| self.render(ctx))
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(render_all),
            None => render_all(),
        }
    }

    fn render_unsilenced(&self, context: &mut Context) -> Result<String, RenderError> {
        let data = self.resolve(context)?;
        self.tag.output(&data, context)
    }
}

/// A pool of `threads` workers; zero means the global rayon pool.
fn build_pool(threads: usize) -> Option<Arc<ThreadPool>> {
    if threads == 0 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(Arc::new(pool)),
        Err(e) => {
            warn!(error = %e, "failed to create thread pool, using the global pool");
            None
        }
    }
}
