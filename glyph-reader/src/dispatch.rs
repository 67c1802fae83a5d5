//! The `#` dispatch-macro reader: a second character table, keyed on the
//! character immediately following `#`, distinct from the top-level table in
//! `reader.rs`.
//!
//! Corresponds to `spec.md` §4.11, grounded in `lispreader.py`'s
//! `dispatchMacros` table and its `varQuoteReader`/`regexReader` entries.

use crate::anon_fn;
use crate::collections;
use crate::compiler_env::CompilerEnv;
use crate::form::{CompiledRegex, Form};
use crate::meta;
use crate::reader::{read, read_line_comment, MacroOutcome, ReaderContext};
use crate::stream::CharStream;
use glyph_util::{ReaderError, ReaderResult, Symbol};
use std::rc::Rc;

/// Dispatch the character immediately following `#` (not yet consumed from
/// `stream`) to its reader.
pub(crate) fn read_dispatch<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<MacroOutcome> {
    let (hash_line, hash_col) = stream.line_col();
    let ch = stream
        .next_char()
        .ok_or_else(|| ReaderError::eof_while_reading(hash_line, hash_col))?;

    match ch {
        '{' => Ok(MacroOutcome::Form(collections::read_set(stream, ctx)?)),
        '"' => Ok(MacroOutcome::Form(read_regex(stream)?)),
        '_' => {
            read(stream, ctx, true, Form::Nil)?;
            Ok(MacroOutcome::ReRead)
        }
        '!' => Ok(read_line_comment(stream)),
        '(' => Ok(MacroOutcome::Form(anon_fn::read_anon_fn(stream, ctx)?)),
        '\'' => Ok(MacroOutcome::Form(read_var_quote(stream, ctx, hash_line)?)),
        '^' => Ok(MacroOutcome::Form(meta::read_meta(stream, ctx)?)),
        other => {
            let (line, col) = stream.line_col();
            Err(ReaderError::no_dispatch_macro(other, line, col))
        }
    }
}

/// `#'x` -> `(var x)`, with `:line` metadata recording the line of the `#`.
fn read_var_quote<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
    line: u32,
) -> ReaderResult<Form> {
    let form = read(stream, ctx, true, Form::Nil)?;
    Ok(Form::list_with_line(
        vec![Form::Symbol(Symbol::intern_bare("var")), form],
        line,
    ))
}

/// `#"pattern"`, the opening quote already consumed. Escapes are copied
/// through verbatim (not interpreted), matching `spec.md` §4.11; only an
/// unescaped `"` ends the pattern.
fn read_regex<S: CharStream>(stream: &mut S) -> ReaderResult<Form> {
    let mut pattern = String::new();
    loop {
        let (line, col) = stream.line_col();
        let ch = stream
            .next_char()
            .ok_or_else(|| ReaderError::eof_in_regex(line, col))?;
        if ch == '"' {
            break;
        }
        if ch == '\\' {
            pattern.push(ch);
            let (l2, c2) = stream.line_col();
            let escaped = stream
                .next_char()
                .ok_or_else(|| ReaderError::eof_in_regex(l2, c2))?;
            pattern.push(escaped);
            continue;
        }
        pattern.push(ch);
    }

    let (line, col) = stream.line_col();
    let compiled = regex::Regex::new(&pattern)
        .map_err(|e| ReaderError::new(format!("Invalid regex pattern: {e}"), line, col))?;
    Ok(Form::Regex(Rc::new(CompiledRegex {
        source: pattern,
        pattern: compiled,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_string;
    use num_bigint::BigInt;

    #[test]
    fn set_dispatch_reads_a_set() {
        let form = read_string("#{1 2 3}").unwrap();
        assert!(matches!(form, Form::Set(_)));
    }

    #[test]
    fn duplicate_set_elements_are_rejected() {
        assert!(read_string("#{1 1}").is_err());
    }

    #[test]
    fn regex_dispatch_compiles_pattern_and_keeps_source() {
        let form = read_string(r#"#"a.b""#).unwrap();
        match form {
            Form::Regex(r) => assert_eq!(r.source, "a.b"),
            other => panic!("expected regex, got {other:?}"),
        }
    }

    #[test]
    fn regex_escapes_are_kept_verbatim() {
        let form = read_string(r#"#"a\"b""#);
        // `\"` is an escaped quote, so the pattern isn't terminated early.
        match form.unwrap() {
            Form::Regex(r) => assert_eq!(r.source, r#"a\"b"#),
            other => panic!("expected regex, got {other:?}"),
        }
    }

    #[test]
    fn discard_skips_exactly_one_form() {
        let form = read_string("#_1 2").unwrap();
        assert_eq!(form, Form::Integer(BigInt::from(2)));
    }

    #[test]
    fn shebang_is_treated_as_a_line_comment() {
        let form = read_string("#!/usr/bin/env glyph\n42").unwrap();
        assert_eq!(form, Form::Integer(BigInt::from(42)));
    }

    #[test]
    fn var_quote_wraps_the_symbol_and_attaches_line_metadata() {
        let form = read_string("#'foo").unwrap();
        match form {
            Form::List(elements, meta) => {
                assert_eq!(elements.len(), 2);
                assert_eq!(elements[0], Form::Symbol(Symbol::intern_bare("var")));
                assert_eq!(elements[1], Form::Symbol(Symbol::intern_bare("foo")));
                assert!(meta.is_some());
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn deprecated_dispatch_meta_alias_attaches_metadata() {
        let form = read_string("#^:foo (bar)").unwrap();
        match form {
            Form::List(elements, meta) => {
                assert_eq!(elements[0], Form::Symbol(Symbol::intern_bare("bar")));
                assert!(meta.is_some());
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn unknown_dispatch_character_is_an_error() {
        let err = read_string("#@").unwrap_err();
        assert!(err.message.contains("No dispatch macro"));
    }
}
