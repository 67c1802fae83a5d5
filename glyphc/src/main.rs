//! Glyphc CLI - a command-line front end for the Glyph reader.
//!
//! Parses command-line arguments, initializes logging, loads configuration,
//! and dispatches to the appropriate command handler. Grounded in `faxt`'s
//! `main.rs` shape (global flags, `tracing-subscriber` setup, config load
//! before command dispatch) cut down to the one command this crate offers.

mod commands;
mod config;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::read::{run_read, ReadArgs};
use config::Config;
use error::{GlyphcError, Result};

/// Glyphc - a CLI front end for the Glyph reader
#[derive(Parser, Debug)]
#[command(name = "glyphc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read Glyph source and print the forms it contains", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "GLYPHC_VERBOSE")]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "GLYPHC_CONFIG")]
    config: Option<PathBuf>,

    /// Disable color output
    #[arg(long, global = true, env = "GLYPHC_NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the glyphc CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Read one or more files (or stdin, if none are given) and print the
    /// forms they contain, one per line, in source order.
    Read(ReadCommand),
}

/// Arguments for the `read` subcommand.
#[derive(Parser, Debug)]
struct ReadCommand {
    /// Source files to read. Reads stdin when none are given.
    files: Vec<PathBuf>,

    /// Namespace to resolve bare syntax-quoted symbols against, overriding
    /// `read.default_ns` from config.
    #[arg(long)]
    ns: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.no_color)?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Read(args) => run_read(
            ReadArgs {
                files: args.files,
                ns: args.ns,
                verbose: cli.verbose,
            },
            &config,
        ),
    }
}

/// Initialize the `tracing` subscriber the reader's spans/events feed into.
fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let subscriber = fmt::layer()
        .with_ansi(!no_color)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| GlyphcError::Config(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}

fn load_config(config_path: Option<&std::path::Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read_with_no_files() {
        let cli = Cli::parse_from(["glyphc", "read"]);
        match cli.command {
            Commands::Read(args) => assert!(args.files.is_empty()),
        }
    }

    #[test]
    fn parses_read_with_files_and_ns() {
        let cli = Cli::parse_from(["glyphc", "read", "a.glyph", "b.glyph", "--ns", "demo"]);
        match cli.command {
            Commands::Read(args) => {
                assert_eq!(args.files, vec![PathBuf::from("a.glyph"), PathBuf::from("b.glyph")]);
                assert_eq!(args.ns, Some("demo".to_string()));
            }
        }
    }

    #[test]
    fn global_verbose_flag_is_recognized() {
        let cli = Cli::parse_from(["glyphc", "--verbose", "read"]);
        assert!(cli.verbose);
    }

    #[test]
    fn global_config_flag_is_recognized() {
        let cli = Cli::parse_from(["glyphc", "--config", "/path/to/glyphc.toml", "read"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/glyphc.toml")));
    }
}
