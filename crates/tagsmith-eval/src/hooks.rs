//! Directive-level clean hooks.
//!
//! Hooks are registered by argument name when a directive is declared and
//! looked up by the resolver; nothing is probed by name at render time.

use crate::data::ResolvedData;
use crate::error::ValidationError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tagsmith_syntax::Value;

/// Receives one cleaned argument value and may transform or reject it.
pub type ArgHook = Arc<dyn Fn(Value) -> Result<Value, ValidationError> + Send + Sync>;

/// Receives the complete bag after every argument has been cleaned.
pub type DataHook = Arc<dyn Fn(ResolvedData) -> Result<ResolvedData, ValidationError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct CleanHooks {
    per_arg: HashMap<String, ArgHook>,
    whole: Option<DataHook>,
}

impl CleanHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_arg(&mut self, name: impl Into<String>, hook: ArgHook) {
        self.per_arg.insert(name.into(), hook);
    }

    pub fn set_whole(&mut self, hook: DataHook) {
        self.whole = Some(hook);
    }

    pub fn arg(&self, name: &str) -> Option<&ArgHook> {
        self.per_arg.get(name)
    }

    pub fn whole(&self) -> Option<&DataHook> {
        self.whole.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.per_arg.is_empty() && self.whole.is_none()
    }

    /// Fills in hooks from `base` that this set does not override.
    pub fn inherit(&mut self, base: &CleanHooks) {
        for (name, hook) in &base.per_arg {
            self.per_arg
                .entry(name.clone())
                .or_insert_with(|| Arc::clone(hook));
        }
        if self.whole.is_none() {
            self.whole = base.whole.clone();
        }
    }
}

impl fmt::Debug for CleanHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.per_arg.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CleanHooks")
            .field("per_arg", &names)
            .field("whole", &self.whole.is_some())
            .finish()
    }
}
