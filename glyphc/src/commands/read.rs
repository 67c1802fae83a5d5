//! The `read` subcommand: reads one or more files (or stdin, when none are
//! given) through `glyph-reader` and prints the resulting forms, one per
//! line, in source order.

use std::io::Read as _;
use std::path::PathBuf;

use glyph_reader::compiler_env::SimpleCompilerEnv;
use glyph_reader::reader::{read, ReaderContext};
use glyph_reader::stream::StringStream;
use glyph_util::ReaderError;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{GlyphcError, Result};

/// Arguments for the `read` subcommand, assembled by `main.rs` from parsed
/// CLI flags plus the loaded config (mirroring `faxt`'s `*Args` structs).
pub struct ReadArgs {
    pub files: Vec<PathBuf>,
    pub ns: Option<String>,
    pub verbose: bool,
}

pub fn run_read(args: ReadArgs, config: &Config) -> Result<()> {
    let ns = args.ns.unwrap_or_else(|| config.read.default_ns.clone());
    let continue_on_error = config.read.continue_on_error;
    let compiler = SimpleCompilerEnv::new(ns);

    if args.files.is_empty() {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        return read_and_print(&source, "<stdin>", &compiler, continue_on_error, args.verbose);
    }

    for path in &args.files {
        let source = std::fs::read_to_string(path)?;
        let display_path = path.display().to_string();
        read_and_print(&source, &display_path, &compiler, continue_on_error, args.verbose)?;
    }
    Ok(())
}

/// Read every top-level form out of `source` and print it, stopping at the
/// first error unless `continue_on_error` is set.
fn read_and_print(
    source: &str,
    display_path: &str,
    compiler: &SimpleCompilerEnv,
    continue_on_error: bool,
    verbose: bool,
) -> Result<()> {
    let ctx = ReaderContext::new(compiler);
    let mut stream = StringStream::new(source);

    loop {
        match read(&mut stream, &ctx, true, glyph_reader::Form::Nil) {
            Ok(form) => {
                if verbose {
                    debug!(path = display_path, %form, "read form");
                }
                println!("{form}");
            }
            Err(e) if is_clean_eof(&e) => return Ok(()),
            Err(e) => {
                let err = GlyphcError::Read {
                    path: display_path.to_string(),
                    source: e,
                };
                if continue_on_error {
                    warn!(path = display_path, error = %err, "skipping unreadable form");
                    continue;
                }
                return Err(err);
            }
        }
    }
}

/// `true` for the specific "ran out of input between top-level forms"
/// message `ReaderError::eof_while_reading` produces — every other EOF
/// variant (inside a string, a collection, etc.) is a real error, not a
/// clean end of input.
fn is_clean_eof(err: &ReaderError) -> bool {
    err.message == "EOF while reading"
}
