//! Runtime configuration for rendering.
//!
//! [`Config`] controls the silence policy, strict variable handling, the
//! parse cache and render parallelism. Use [`Config::default()`] for
//! sensible defaults (errors propagate, missing variables on nullable
//! arguments become null, 128 cached invocations, all cores).
//!
//! # Config file: `tagsmith.toml`
//!
//! ```toml
//! # tagsmith.toml example
//! silence_errors = true
//! invalid_placeholder = "[invalid]"
//! strict_variables = false
//! parse_cache_size = 256
//! parallel_threads = 4
//! ```
//!
//! All fields are optional. [`Config::load`] looks for `tagsmith.toml` or
//! `.tagsmith/tagsmith.toml`, walking up from a start directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "tagsmith.toml";
pub const CONFIG_DIR: &str = ".tagsmith";

/// TOML-friendly intermediate representation (all fields optional).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    silence_errors: Option<bool>,
    invalid_placeholder: Option<String>,
    strict_variables: Option<bool>,
    /// Parsed invocations kept by a library (0 disables caching).
    parse_cache_size: Option<usize>,
    /// Threads for `render_each` (0 = all cores).
    parallel_threads: Option<usize>,
}

/// Runtime configuration for a [`Library`](crate::Library).
///
/// # Defaults
///
/// | Setting | Default |
/// |---------|---------|
/// | `silence_errors` | `false` |
/// | `invalid_placeholder` | `""` |
/// | `strict_variables` | `false` |
/// | `parse_cache_size` | `128` |
/// | `parallel_threads` | `0` (= use all available cores) |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Turn render-time validation failures into `invalid_placeholder`
    /// output. Tags may override this with `TagBuilder::silence_errors`.
    pub silence_errors: bool,
    /// Output used in place of a silenced failure.
    pub invalid_placeholder: String,
    /// Treat a missing variable as an error even on nullable arguments.
    pub strict_variables: bool,
    pub parse_cache_size: usize,
    /// Maximum number of threads for `Node::render_each`.
    /// `0` means "use all available cores" (rayon default).
    pub parallel_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            silence_errors: false,
            invalid_placeholder: String::new(),
            strict_variables: false,
            parse_cache_size: 128,
            parallel_threads: 0,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the nearest `tagsmith.toml` above `start_dir`.
    ///
    /// Returns `Config::default()` if no config file is found.
    pub fn load(start_dir: impl AsRef<Path>) -> Result<Self> {
        match Self::find_config(start_dir) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(toml_str: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(toml_str).context("Failed to parse config")?;

        let defaults = Self::default();
        Ok(Self {
            silence_errors: file.silence_errors.unwrap_or(defaults.silence_errors),
            invalid_placeholder: file
                .invalid_placeholder
                .unwrap_or(defaults.invalid_placeholder),
            strict_variables: file.strict_variables.unwrap_or(defaults.strict_variables),
            parse_cache_size: file.parse_cache_size.unwrap_or(defaults.parse_cache_size),
            parallel_threads: file.parallel_threads.unwrap_or(defaults.parallel_threads),
        })
    }

    /// Walks up from `start_dir` looking for `tagsmith.toml` or
    /// `.tagsmith/tagsmith.toml`.
    pub fn find_config(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
        let mut dir = start_dir.as_ref().to_path_buf();

        // Make sure we have an absolute path
        if let Ok(abs) = dir.canonicalize() {
            dir = abs;
        }

        loop {
            let file = dir.join(CONFIG_FILE);
            if file.is_file() {
                return Some(file);
            }

            let nested = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if nested.is_file() {
                return Some(nested);
            }

            if !dir.pop() {
                return None;
            }
        }
    }

    /// Builder: silence render-time validation failures.
    pub fn with_silence_errors(mut self, silence: bool) -> Self {
        self.silence_errors = silence;
        self
    }

    /// Builder: set the placeholder used for silenced failures.
    pub fn with_invalid_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.invalid_placeholder = placeholder.into();
        self
    }

    pub fn with_strict_variables(mut self, strict: bool) -> Self {
        self.strict_variables = strict;
        self
    }

    pub fn with_parse_cache_size(mut self, size: usize) -> Self {
        self.parse_cache_size = size;
        self
    }

    /// Builder: limit parallel threads (`0` = all cores).
    pub fn with_parallel_threads(mut self, n: usize) -> Self {
        self.parallel_threads = n;
        self
    }
}
