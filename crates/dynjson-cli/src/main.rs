//! `dynjson` CLI: format, minify, and validate JSON from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Pretty-print (stdin → stdout, 2-space indent)
//! echo '{"name":"Alice","tags":["a"]}' | dynjson format
//!
//! # Tab indentation, file to file
//! dynjson format --indent-str $'\t' -i data.json -o pretty.json
//!
//! # Minify, dropping some members at any depth
//! dynjson minify --omit etag,kind -i data.json
//!
//! # Validate only
//! dynjson check -i data.json
//! ```
//!
//! Diagnostics go to stderr; set `RUST_LOG=debug` to see parse/stringify events.

use std::collections::HashSet;
use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dynjson::{Callable, ParseOptions, Space, StringifyOptions, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dynjson", version, about = "Format, minify and validate JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-indent JSON
    Format {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Spaces per indentation level (clamped to 10; 0 means compact)
        #[arg(long, default_value_t = 2, conflicts_with = "indent_str")]
        indent: i64,
        /// Literal indentation unit, e.g. a tab (first 10 UTF-16 code units used)
        #[arg(long)]
        indent_str: Option<String>,
        /// Comma-separated member names to drop at any depth
        #[arg(long)]
        omit: Option<String>,
        /// Maximum nesting depth accepted when reading and writing (writing caps at 1024)
        #[arg(long, default_value_t = dynjson::options::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Rewrite JSON without insignificant whitespace
    Minify {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Comma-separated member names to drop at any depth
        #[arg(long)]
        omit: Option<String>,
    },
    /// Validate JSON and print `ok`
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Format {
            input,
            output,
            indent,
            indent_str,
            omit,
            max_depth,
        } => {
            let space = match indent_str {
                Some(unit) => Space::from(unit),
                None => Space::Count(indent),
            };
            let options = StringifyOptions::default()
                .with_space(space)
                .with_max_depth(max_depth);
            let text = read_input(input.as_deref())?;
            let value = parse_text(&text, &ParseOptions::default().with_max_depth(max_depth))?;
            let formatted = render(&value, omit.as_deref(), &options)?;
            write_output(output.as_deref(), &formatted)?;
        }
        Commands::Minify {
            input,
            output,
            omit,
        } => {
            let text = read_input(input.as_deref())?;
            let value = parse_text(&text, &ParseOptions::default())?;
            let minified = render(&value, omit.as_deref(), &StringifyOptions::default())?;
            write_output(output.as_deref(), &minified)?;
        }
        Commands::Check { input } => {
            let text = read_input(input.as_deref())?;
            parse_text(&text, &ParseOptions::default())?;
            println!("ok");
        }
    }

    Ok(())
}

/// Diagnostics on stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_text(text: &str, options: &ParseOptions) -> Result<Value> {
    dynjson::parse_with(text, None, options).context("Failed to parse JSON")
}

/// Serializes `value`, dropping members named in the comma-separated `omit` list.
fn render(value: &Value, omit: Option<&str>, options: &StringifyOptions) -> Result<String> {
    let replacer = omit.map(parse_omit_list).filter(|keys| !keys.is_empty()).map(omit_replacer);
    let text = dynjson::stringify_with_options(value, replacer.as_ref(), options)
        .context("Failed to serialize JSON")?;
    // Only reachable when the replacer drops the root, which it never does.
    Ok(text.unwrap_or_default())
}

/// `etag, kind,,` → `{"etag", "kind"}`. Empty entries are ignored.
fn parse_omit_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn omit_replacer(keys: HashSet<String>) -> Callable {
    debug!(count = keys.len(), "omitting members");
    Callable::new(move |this, args| {
        let key = args.first().and_then(Value::as_string);
        let dropped = matches!(this, Value::Object(_))
            && key.is_some_and(|key| keys.contains(&key.to_string_lossy()));
        if dropped {
            Ok(Value::Undefined)
        } else {
            Ok(args.get(1).cloned().unwrap_or_default())
        }
    })
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{content}\n"))
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
