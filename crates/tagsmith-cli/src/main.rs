//! # tagsmith-cli
//!
//! Command-line interface for tagsmith directives.
//!
//! Loads tag declarations from a TOML file, then renders or inspects a
//! single invocation line against a JSON context.

mod errors;
mod tagfile;

use anyhow::{Context as _, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tagsmith::eval::json_to_value;
use tagsmith::{Config, Context, Library};
use tracing::debug;

use errors::{enhance_render_error, enhance_syntax_error};
use tagfile::TagFile;

#[derive(Parser)]
#[command(name = "tagsmith")]
#[command(about = "Declare, inspect and render template directives", long_about = None)]
#[command(version)]
struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one invocation and print its output
    Render {
        /// TOML file with the tag declarations
        #[arg(short, long, value_name = "FILE")]
        tags: PathBuf,

        /// JSON object used as the render context
        #[arg(short, long, value_name = "FILE")]
        context: Option<PathBuf>,

        /// Set a context variable; the value is parsed as JSON, falling back to a string
        #[arg(short, long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Config file (default: nearest tagsmith.toml)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// The invocation, e.g. "greet user.name punct '!'"
        invocation: String,
    },
    /// Parse one invocation and print how its arguments were bound
    Inspect {
        #[arg(short, long, value_name = "FILE")]
        tags: PathBuf,

        invocation: String,
    },
    /// List declared tags and their syntax
    Tags {
        #[arg(short, long, value_name = "FILE")]
        tags: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            tags,
            context,
            set,
            config,
            invocation,
        } => render(&tags, context.as_deref(), &set, config.as_deref(), &invocation),
        Commands::Inspect { tags, invocation } => inspect(&tags, &invocation),
        Commands::Tags { tags } => list_tags(&tags),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::from_file(path),
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            Config::load(cwd)
        }
    }
}

fn load_library(tags: &Path, config: Config) -> Result<Library> {
    let library = TagFile::load(tags)?.into_library(config)?;
    debug!(path = %tags.display(), tags = library.tags().len(), "loaded tag declarations");
    Ok(library)
}

fn load_context(path: Option<&Path>, assignments: &[String]) -> Result<Context> {
    let mut ctx = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read context file: {}", path.display()))?;
            Context::from_json_str(&source)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => Context::new(),
    };

    for assignment in assignments {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{}'", assignment))?;
        let json = serde_json::from_str::<serde_json::Value>(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        ctx.insert(name.trim(), json_to_value(json));
    }

    Ok(ctx)
}

fn render(
    tags: &Path,
    context: Option<&Path>,
    set: &[String],
    config: Option<&Path>,
    invocation: &str,
) -> Result<()> {
    let library = load_library(tags, load_config(config)?)?;
    let mut ctx = load_context(context, set)?;

    match library.render(invocation, &mut ctx) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(err) => {
            enhance_render_error(&err, invocation, &library).display();
            std::process::exit(1);
        }
    }
}

fn inspect(tags: &Path, invocation: &str) -> Result<()> {
    let library = load_library(tags, Config::default())?;

    let node = match library.parse(invocation) {
        Ok(node) => node,
        Err(err) => {
            enhance_syntax_error(&err, invocation, &library).display();
            std::process::exit(1);
        }
    };

    let schema = node.tag().schema();
    println!("{} {}", "tag".cyan().bold(), schema.name().bold());
    for spec in schema.args() {
        let bound = match node.bound().get(spec.name()) {
            Some(value) => value.describe(),
            None => "(absent)".dimmed().to_string(),
        };
        let role = if spec.is_positional() { "positional" } else { "keyword" };
        println!(
            "  {:<16} {:<10} {:?} = {}",
            spec.name().green(),
            role,
            spec.kind(),
            bound
        );
    }
    Ok(())
}

fn list_tags(tags: &Path) -> Result<()> {
    let library = load_library(tags, Config::default())?;

    if library.tags().is_empty() {
        println!("{}", "No tags declared.".yellow());
        return Ok(());
    }

    for tag in library.tags() {
        let schema = tag.schema();
        println!("{}", schema.usage());
        if let Some(end) = schema.end_tag() {
            println!("  {} {}", "...".dimmed(), end);
        }
    }
    Ok(())
}
