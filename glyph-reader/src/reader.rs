//! The top-level read loop, the macro-character dispatch table, and the
//! dynamically-scoped [`ReaderContext`] every reader macro is threaded
//! through.
//!
//! Corresponds to `spec.md` §4.2 (top-level read), §4.3 (token reader),
//! §4.8 (comment readers), and §4.9 (discard reader).

use crate::collections;
use crate::compiler_env::CompilerEnv;
use crate::dispatch;
use crate::escape;
use crate::form::Form;
use crate::meta;
use crate::number;
use crate::stream::CharStream;
use crate::syntax_quote;
use crate::token;
use glyph_util::gensym::GensymCounter;
use glyph_util::{ReaderError, ReaderResult, Symbol};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Characters whitespace is skipped over between forms. Comma counts as
/// whitespace, matching the source language's convention of using it as an
/// optional, purely cosmetic separator.
pub(crate) fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | ',')
}

/// Characters registered as top-level reader macros.
pub(crate) fn is_macro(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | '(' | ')' | '[' | ']' | '{' | '}' | ';' | '#' | '^' | '%' | '`' | '~' | '\\'
    )
}

/// A macro character that terminates a token/number even when it wouldn't
/// otherwise be invoked as a macro — every macro character except `#` and
/// `'`, both of which are legal inside a plain symbol.
pub(crate) fn is_terminating_macro(ch: char) -> bool {
    ch != '#' && ch != '\'' && is_macro(ch)
}

pub(crate) fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// What a reader macro produced: either a form, or a signal that nothing
/// was produced and the caller should loop and read again (used by
/// comments and `#_` discard).
pub(crate) enum MacroOutcome {
    Form(Form),
    ReRead,
}

/// Dynamically-scoped state threaded through every recursive reader call:
/// the anonymous-function argument environment and the syntax-quote gensym
/// environment from `spec.md` §3/§5.
///
/// Realized as `RefCell`s behind a shared reference (rather than `&mut
/// ReaderContext` passed around) so that the RAII guards below can hold a
/// reference to the same context that's simultaneously threaded through
/// recursive `read` calls, without the aliasing conflict a `&mut` field
/// borrow would create.
pub struct ReaderContext<'a, C: CompilerEnv> {
    pub compiler: &'a C,
    gensym_counter: &'a GensymCounter,
    arg_env: RefCell<Option<BTreeMap<i64, Symbol>>>,
    gensym_env: RefCell<Option<BTreeMap<Symbol, Symbol>>>,
}

impl<'a, C: CompilerEnv> ReaderContext<'a, C> {
    pub fn new(compiler: &'a C) -> Self {
        Self::with_gensym_counter(compiler, GensymCounter::global())
    }

    pub fn with_gensym_counter(compiler: &'a C, gensym_counter: &'a GensymCounter) -> Self {
        Self {
            compiler,
            gensym_counter,
            arg_env: RefCell::new(None),
            gensym_env: RefCell::new(None),
        }
    }

    pub(crate) fn next_gensym_id(&self) -> u64 {
        self.gensym_counter.next_id()
    }

    pub(crate) fn arg_env_active(&self) -> bool {
        self.arg_env.borrow().is_some()
    }

    pub(crate) fn register_arg(&self, n: i64) -> Symbol {
        let mut guard = self.arg_env.borrow_mut();
        let map = guard.as_mut().expect("register_arg called outside #()");
        if let Some(sym) = map.get(&n) {
            return *sym;
        }
        let id = self.next_gensym_id();
        let name = if n == -1 {
            format!("rest__{id}#")
        } else {
            format!("p{n}__{id}#")
        };
        let sym = Symbol::intern_bare(&name);
        map.insert(n, sym);
        sym
    }

    pub(crate) fn arg_env_snapshot(&self) -> BTreeMap<i64, Symbol> {
        self.arg_env
            .borrow()
            .clone()
            .expect("arg_env_snapshot called outside #()")
    }

    pub(crate) fn gensym_env_active(&self) -> bool {
        self.gensym_env.borrow().is_some()
    }

    pub(crate) fn resolve_gensym(
        &self,
        sym: Symbol,
        stripped_name: &str,
        line: u32,
        col: u32,
    ) -> ReaderResult<Symbol> {
        let mut guard = self.gensym_env.borrow_mut();
        let map = guard
            .as_mut()
            .ok_or_else(|| ReaderError::gensym_outside_syntax_quote(line, col))?;
        if let Some(existing) = map.get(&sym) {
            return Ok(*existing);
        }
        let id = self.next_gensym_id();
        let fresh = Symbol::intern_bare(&format!("{stripped_name}__{id}__auto__"));
        map.insert(sym, fresh);
        Ok(fresh)
    }
}

/// Scoped acquisition of a fresh `ARG_ENV`, restored to its previous value
/// (nested `#()`s are rejected before this is ever entered, so that
/// previous value is always `None` in practice, but the guard restores
/// whatever was there unconditionally).
pub(crate) struct ArgEnvGuard<'ctx, 'a, C: CompilerEnv> {
    ctx: &'ctx ReaderContext<'a, C>,
    previous: Option<BTreeMap<i64, Symbol>>,
}

impl<'ctx, 'a, C: CompilerEnv> ArgEnvGuard<'ctx, 'a, C> {
    pub(crate) fn enter(ctx: &'ctx ReaderContext<'a, C>) -> Self {
        let previous = ctx.arg_env.replace(Some(BTreeMap::new()));
        Self { ctx, previous }
    }
}

impl<'ctx, 'a, C: CompilerEnv> Drop for ArgEnvGuard<'ctx, 'a, C> {
    fn drop(&mut self) {
        *self.ctx.arg_env.borrow_mut() = self.previous.take();
    }
}

/// Scoped acquisition of a fresh `GENSYM_ENV` around one syntax-quoted
/// form.
pub(crate) struct GensymEnvGuard<'ctx, 'a, C: CompilerEnv> {
    ctx: &'ctx ReaderContext<'a, C>,
    previous: Option<BTreeMap<Symbol, Symbol>>,
}

impl<'ctx, 'a, C: CompilerEnv> GensymEnvGuard<'ctx, 'a, C> {
    pub(crate) fn enter(ctx: &'ctx ReaderContext<'a, C>) -> Self {
        let previous = ctx.gensym_env.replace(Some(BTreeMap::new()));
        Self { ctx, previous }
    }
}

impl<'ctx, 'a, C: CompilerEnv> Drop for GensymEnvGuard<'ctx, 'a, C> {
    fn drop(&mut self) {
        *self.ctx.gensym_env.borrow_mut() = self.previous.take();
    }
}

fn eof_error(stream: &impl CharStream) -> ReaderError {
    let (line, col) = stream.line_col();
    ReaderError::eof_while_reading(line, col)
}

pub(crate) fn unmatched_delimiter(delim: char, stream: &impl CharStream) -> ReaderError {
    let (line, col) = stream.line_col();
    ReaderError::unmatched_delimiter(delim, line, col)
}

/// Dispatch a top-level macro character to its reader, or `None` if `ch`
/// isn't a registered macro character at all.
fn dispatch_macro<S: CharStream, C: CompilerEnv>(
    ch: char,
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> Option<ReaderResult<MacroOutcome>> {
    match ch {
        '"' => Some(escape::read_string_literal(stream).map(MacroOutcome::Form)),
        '\'' => Some(read_wrapping(stream, ctx, "quote").map(MacroOutcome::Form)),
        '(' => Some(collections::read_list(stream, ctx).map(MacroOutcome::Form)),
        ')' => Some(Err(unmatched_delimiter(')', stream))),
        '[' => Some(collections::read_vector(stream, ctx).map(MacroOutcome::Form)),
        ']' => Some(Err(unmatched_delimiter(']', stream))),
        '{' => Some(collections::read_map(stream, ctx).map(MacroOutcome::Form)),
        '}' => Some(Err(unmatched_delimiter('}', stream))),
        ';' => Some(Ok(read_line_comment(stream))),
        '#' => Some(dispatch::read_dispatch(stream, ctx)),
        '^' => Some(meta::read_meta(stream, ctx).map(MacroOutcome::Form)),
        '%' => Some(crate::anon_fn::read_arg(stream, ctx).map(MacroOutcome::Form)),
        '`' => Some(syntax_quote::read_syntax_quote(stream, ctx).map(MacroOutcome::Form)),
        '~' => Some(syntax_quote::read_unquote(stream, ctx).map(MacroOutcome::Form)),
        '\\' => Some(escape::read_character_literal(stream).map(MacroOutcome::Form)),
        _ => None,
    }
}

/// Invoke the macro reader registered for `ch`, collapsing its
/// [`MacroOutcome`] into a plain `Option<Form>` (`None` meaning the macro
/// produced nothing and scanning should continue, as comments and `#_`
/// discard do). Only ever called with a `ch` for which [`is_macro`] is
/// `true`.
pub(crate) fn dispatch_one<S: CharStream, C: CompilerEnv>(
    ch: char,
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<Option<Form>> {
    match dispatch_macro(ch, stream, ctx) {
        Some(Ok(MacroOutcome::Form(form))) => Ok(Some(form)),
        Some(Ok(MacroOutcome::ReRead)) => Ok(None),
        Some(Err(e)) => Err(e),
        None => unreachable!("dispatch_one called for a non-macro character"),
    }
}

/// `'x`, and any other reader macro that just wraps the next form in
/// `(sym x)` (only `quote` at the top level; `#'`'s `(var x)` wrapping
/// lives in `dispatch.rs` since it also attaches `:line` metadata).
pub(crate) fn read_wrapping<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
    sym_name: &str,
) -> ReaderResult<Form> {
    let form = read(stream, ctx, true, Form::Nil)?;
    Ok(Form::list(vec![
        Form::Symbol(Symbol::intern_bare(sym_name)),
        form,
    ]))
}

pub(crate) fn read_line_comment<S: CharStream>(stream: &mut S) -> MacroOutcome {
    loop {
        match stream.next_char() {
            None | Some('\n') | Some('\r') => break,
            Some(_) => continue,
        }
    }
    MacroOutcome::ReRead
}

/// Accumulate a raw token: characters up to EOF, whitespace, or a
/// terminating macro character, with the stopping character pushed back.
pub(crate) fn read_raw_token<S: CharStream>(stream: &mut S, initch: char) -> String {
    let mut buf = String::new();
    buf.push(initch);
    loop {
        match stream.next_char() {
            None => break,
            Some(ch) if is_whitespace(ch) || is_terminating_macro(ch) => {
                stream.push_back();
                break;
            }
            Some(ch) => buf.push(ch),
        }
    }
    buf
}

/// Read one form from `stream`.
///
/// `eof_is_error` controls whether running out of input before a form is
/// found is a failure (`ReaderError`) or returns `eof_value`. `recursive`
/// is accepted for parity with the collaborator interface in `spec.md` §6
/// but doesn't otherwise affect behavior in this implementation.
pub fn read<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
    eof_is_error: bool,
    eof_value: Form,
) -> ReaderResult<Form> {
    let result = read_impl(stream, ctx, eof_is_error, eof_value, true);
    if let Err(e) = &result {
        tracing::debug!(message = %e.message, line = e.line, col = e.col, "read failed");
    }
    result
}

pub(crate) fn read_impl<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
    eof_is_error: bool,
    eof_value: Form,
    _recursive: bool,
) -> ReaderResult<Form> {
    let _span = tracing::trace_span!("read").entered();
    loop {
        let mut ch = match stream.next_char() {
            Some(c) => c,
            None => {
                return if eof_is_error {
                    Err(eof_error(stream))
                } else {
                    Ok(eof_value)
                };
            }
        };

        while is_whitespace(ch) {
            ch = match stream.next_char() {
                Some(c) => c,
                None => {
                    return if eof_is_error {
                        Err(eof_error(stream))
                    } else {
                        Ok(eof_value)
                    };
                }
            };
        }

        if is_digit(ch) {
            return number::read_number(stream, ch);
        }

        if is_macro(ch) {
            tracing::trace!(macro_char = %ch, "dispatching reader macro");
        }
        if let Some(result) = dispatch_macro(ch, stream, ctx) {
            match result? {
                MacroOutcome::Form(form) => return Ok(form),
                MacroOutcome::ReRead => continue,
            }
        }

        if ch == '+' || ch == '-' {
            match stream.next_char() {
                Some(ch2) if is_digit(ch2) => {
                    stream.push_back();
                    return number::read_number(stream, ch);
                }
                Some(_) => stream.push_back(),
                None => {}
            }
        }

        let token = read_raw_token(stream, ch);
        let (line, col) = stream.line_col();
        return token::interpret_token_with_ctx(&token, ctx, line, col);
    }
}

/// Convenience entry point: read exactly one form out of `text`, ignoring
/// anything after it, treating EOF-before-a-form as `nil` rather than an
/// error (matching `readString`'s documented convenience semantics).
pub fn read_string(text: &str) -> ReaderResult<Form> {
    use crate::compiler_env::NullCompilerEnv;
    let env = NullCompilerEnv;
    let ctx = ReaderContext::new(&env);
    let mut stream = crate::stream::StringStream::new(text);
    read(&mut stream, &ctx, false, Form::Nil)
}

/// Like [`read_string`] but with an explicit compiler collaborator, for
/// callers that need syntax-quote symbol resolution against a real
/// namespace.
pub fn read_string_with<C: CompilerEnv>(text: &str, compiler: &C) -> ReaderResult<Form> {
    let ctx = ReaderContext::new(compiler);
    let mut stream = crate::stream::StringStream::new(text);
    read(&mut stream, &ctx, false, Form::Nil)
}
