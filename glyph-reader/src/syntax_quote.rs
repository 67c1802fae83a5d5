//! Syntax quote (`` ` ``) expansion and its `~`/`~@` companions.
//!
//! Corresponds to `spec.md` §4.14/§4.15, grounded in `lispreader.py`'s
//! `SyntaxQuoteReader`/`syntaxQuote`/`sqExpandList`. `syntax_quote` below is
//! a straight port of that algorithm's case analysis; `resolve_gensym` (the
//! GENSYM_ENV half of it) already lives on [`ReaderContext`] in
//! `reader.rs`.

use crate::compiler_env::CompilerEnv;
use crate::form::Form;
use crate::reader::{read, GensymEnvGuard, ReaderContext};
use crate::stream::CharStream;
use glyph_util::{Keyword, ReaderError, ReaderResult, Symbol};

const UNQUOTE: &str = "unquote";
const UNQUOTE_SPLICING: &str = "unquote-splicing";

/// `` ` ``. Establishes a fresh GENSYM_ENV for the one form read, restored
/// unconditionally on exit by `GensymEnvGuard`.
pub(crate) fn read_syntax_quote<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<Form> {
    let (line, col) = stream.line_col();
    let _guard = GensymEnvGuard::enter(ctx);
    let form = read(stream, ctx, true, Form::Nil)?;
    syntax_quote(&form, ctx, line, col)
}

/// `~`/`~@`.
pub(crate) fn read_unquote<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<Form> {
    let (line, col) = stream.line_col();
    match stream.next_char() {
        Some('@') => {
            let form = read(stream, ctx, true, Form::Nil)?;
            Ok(wrap(UNQUOTE_SPLICING, form))
        }
        Some(_) => {
            stream.push_back();
            let form = read(stream, ctx, true, Form::Nil)?;
            Ok(wrap(UNQUOTE, form))
        }
        None => Err(ReaderError::eof_in_unquote(line, col)),
    }
}

fn wrap(sym_name: &str, form: Form) -> Form {
    Form::list(vec![Form::Symbol(Symbol::intern_bare(sym_name)), form])
}

fn quote_wrap(form: Form) -> Form {
    wrap("quote", form)
}

/// `true` if `form` is `(sym x)` for the given bare symbol name — the shape
/// `~`/`~@` produce, and the shape this module recognizes when it recurses
/// back into already-read unquote forms nested inside a collection.
fn is_tagged(form: &Form, tag: &str) -> bool {
    matches!(
        form,
        Form::List(elements, _)
            if elements.len() == 2
                && matches!(&elements[0], Form::Symbol(s) if s.is_bare() && s.name() == tag)
    )
}

fn tagged_arg(form: &Form) -> Form {
    match form {
        Form::List(elements, _) => elements[1].clone(),
        _ => unreachable!("only called after is_tagged"),
    }
}

fn syntax_quote<C: CompilerEnv>(
    form: &Form,
    ctx: &ReaderContext<C>,
    line: u32,
    col: u32,
) -> ReaderResult<Form> {
    if let Form::Symbol(sym) = form {
        if ctx.compiler.is_builtin(sym) {
            return Ok(quote_wrap(form.clone()));
        }
        return syntax_quote_symbol(*sym, ctx, line, col);
    }

    if is_tagged(form, UNQUOTE) {
        return Ok(tagged_arg(form));
    }
    if is_tagged(form, UNQUOTE_SPLICING) {
        return Err(ReaderError::splice_not_in_list(line, col));
    }

    match form {
        Form::Map(entries) => {
            let flattened: Vec<Form> = entries
                .iter()
                .flat_map(|(k, v)| [k.clone(), v.clone()])
                .collect();
            let expanded = sq_expand(&flattened, ctx, line, col)?;
            maybe_with_meta(form, apply_ctor("hashmap", expanded), ctx, line, col)
        }
        Form::Vector(elements) => {
            let expanded = sq_expand(elements, ctx, line, col)?;
            maybe_with_meta(form, apply_ctor("vector", expanded), ctx, line, col)
        }
        Form::Set(elements) => {
            let items: Vec<Form> = elements.iter().cloned().collect();
            let expanded = sq_expand(&items, ctx, line, col)?;
            maybe_with_meta(form, apply_ctor("vector", expanded), ctx, line, col)
        }
        Form::List(elements, _) => {
            if elements.is_empty() {
                return Ok(Form::list(vec![Form::Symbol(Symbol::intern_bare("list"))]));
            }
            let expanded = sq_expand(elements, ctx, line, col)?;
            maybe_with_meta(form, concat_seq(expanded), ctx, line, col)
        }
        Form::Integer(_) | Form::Ratio(_) | Form::Float(_) | Form::Str(_) | Form::Keyword(_) => {
            Ok(form.clone())
        }
        _ => Ok(quote_wrap(form.clone())),
    }
}

/// The Symbol branch of `syntaxQuote`: auto-gensym, dotted/namespaced
/// pass-through, or current-namespace resolution.
fn syntax_quote_symbol<C: CompilerEnv>(
    sym: Symbol,
    ctx: &ReaderContext<C>,
    line: u32,
    col: u32,
) -> ReaderResult<Form> {
    if sym.is_bare() && sym.name().ends_with('#') {
        let stripped = &sym.name()[..sym.name().len() - 1];
        let resolved = ctx.resolve_gensym(sym, stripped, line, col)?;
        return Ok(quote_wrap(Form::Symbol(resolved)));
    }

    if !sym.is_bare() || sym.name().ends_with('.') || sym.name().starts_with('.') {
        return Ok(quote_wrap(Form::Symbol(sym)));
    }

    let ns = ctx
        .compiler
        .current_ns_name()
        .ok_or_else(|| ReaderError::no_namespace_in_syntax_quote(line, col))?;
    Ok(quote_wrap(Form::Symbol(sym.with_namespace(ns))))
}

/// `sq-expand`: map every element to a `(list x)`/raw-splice form that,
/// concatenated together, reconstructs the original sequence with unquotes
/// substituted in.
fn sq_expand<C: CompilerEnv>(
    items: &[Form],
    ctx: &ReaderContext<C>,
    line: u32,
    col: u32,
) -> ReaderResult<Vec<Form>> {
    items.iter().map(|item| sq_expand_one(item, ctx, line, col)).collect()
}

fn sq_expand_one<C: CompilerEnv>(
    item: &Form,
    ctx: &ReaderContext<C>,
    line: u32,
    col: u32,
) -> ReaderResult<Form> {
    if is_tagged(item, UNQUOTE) {
        return Ok(Form::list(vec![
            Form::Symbol(Symbol::intern_bare("list")),
            tagged_arg(item),
        ]));
    }
    if is_tagged(item, UNQUOTE_SPLICING) {
        return Ok(tagged_arg(item));
    }
    let expanded = syntax_quote(item, ctx, line, col)?;
    Ok(Form::list(vec![Form::Symbol(Symbol::intern_bare("list")), expanded]))
}

fn concat_seq(items: Vec<Form>) -> Form {
    let mut concat_args = vec![Form::Symbol(Symbol::intern_bare("concat"))];
    concat_args.extend(items);
    Form::list(vec![
        Form::Symbol(Symbol::intern_bare("seq")),
        Form::list(concat_args),
    ])
}

fn apply_ctor(ctor: &str, items: Vec<Form>) -> Form {
    Form::list(vec![
        Form::Symbol(Symbol::intern_bare("apply")),
        Form::Symbol(Symbol::intern_bare(ctor)),
        concat_seq(items),
    ])
}

/// Wraps `result` in `(with-meta result <syntaxQuote of meta>)` when `form`
/// carries metadata other than `:line`.
fn maybe_with_meta<C: CompilerEnv>(
    form: &Form,
    result: Form,
    ctx: &ReaderContext<C>,
    line: u32,
    col: u32,
) -> ReaderResult<Form> {
    let Some(meta) = form.metadata() else {
        return Ok(result);
    };
    let line_key = Form::Keyword(Keyword::intern_bare("line"));
    let extra: std::collections::BTreeMap<Form, Form> = meta
        .iter()
        .filter(|(k, _)| **k != line_key)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if extra.is_empty() {
        return Ok(result);
    }
    let quoted_meta = syntax_quote(&Form::map(extra), ctx, line, col)?;
    Ok(Form::list(vec![
        Form::Symbol(Symbol::intern_bare("with-meta")),
        result,
        quoted_meta,
    ]))
}
