//! The `#(...)` anonymous-function reader and the `%`/`%&`/`%n` argument
//! reader active inside it.
//!
//! Corresponds to `spec.md` §4.13, grounded in `lispreader.py`'s
//! `FnReader`/`ArgReader` pair. Argument registration and the dynamically
//! scoped `ARG_ENV` itself live on [`ReaderContext`] in `reader.rs`; this
//! module only implements the two reader macros built on top of it.

use crate::compiler_env::CompilerEnv;
use crate::form::Form;
use crate::reader::{
    is_terminating_macro, is_whitespace, read, read_raw_token, ArgEnvGuard, ReaderContext,
};
use crate::stream::CharStream;
use crate::token::interpret_token_with_ctx;
use glyph_util::{ReaderError, ReaderResult, Symbol};
use num_traits::ToPrimitive;

/// `#(...)`. Nested `#()`s are rejected before a new `ARG_ENV` is ever
/// established, so the guard's restoration is only ever undoing the one it
/// just pushed.
pub(crate) fn read_anon_fn<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<Form> {
    if ctx.arg_env_active() {
        let (line, col) = stream.line_col();
        return Err(ReaderError::nested_anon_fn(line, col));
    }

    let _guard = ArgEnvGuard::enter(ctx);
    // The dispatch reader already consumed the `(` to get here; push it
    // back so the list reader sees it and reads the body as an ordinary
    // list.
    stream.push_back();
    let body = read(stream, ctx, true, Form::Nil)?;
    build_fn_form(ctx, body)
}

fn build_fn_form<C: CompilerEnv>(ctx: &ReaderContext<C>, body: Form) -> ReaderResult<Form> {
    let snapshot = ctx.arg_env_snapshot();
    let max_positive = snapshot.keys().copied().filter(|&k| k > 0).max().unwrap_or(0);

    let mut params = Vec::with_capacity(max_positive.max(0) as usize + 2);
    for i in 1..=max_positive {
        let sym = match snapshot.get(&i) {
            Some(sym) => *sym,
            None => ctx.register_arg(i),
        };
        params.push(Form::Symbol(sym));
    }
    if let Some(rest_sym) = snapshot.get(&-1) {
        params.push(Form::Symbol(Symbol::intern_bare("&")));
        params.push(Form::Symbol(*rest_sym));
    }

    Ok(Form::list(vec![
        Form::Symbol(Symbol::intern_bare("fn")),
        Form::vector(params),
        body,
    ]))
}

/// `%`, `%&`, `%n`. Outside an active `ARG_ENV` this falls back to ordinary
/// token interpretation (`spec.md` §3: "When absent, `%` is interpreted as
/// an ordinary token").
pub(crate) fn read_arg<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<Form> {
    if !ctx.arg_env_active() {
        let token = read_raw_token(stream, '%');
        let (line, col) = stream.line_col();
        return interpret_token_with_ctx(&token, ctx, line, col);
    }

    let (line, col) = stream.line_col();
    match stream.next_char() {
        None => return Ok(Form::Symbol(ctx.register_arg(1))),
        Some(ch) if is_whitespace(ch) || is_terminating_macro(ch) => {
            stream.push_back();
            return Ok(Form::Symbol(ctx.register_arg(1)));
        }
        Some(_) => stream.push_back(),
    }

    let form = read(stream, ctx, true, Form::Nil)?;
    match form {
        Form::Symbol(sym) if sym.is_bare() && sym.name() == "&" => {
            Ok(Form::Symbol(ctx.register_arg(-1)))
        }
        Form::Integer(n) => {
            let n = n.to_i64().ok_or_else(|| ReaderError::bad_arg_literal(line, col))?;
            Ok(Form::Symbol(ctx.register_arg(n)))
        }
        _ => Err(ReaderError::bad_arg_literal(line, col)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_string;

    #[test]
    fn bare_percent_registers_position_one() {
        let form = read_string("#(+ % 1)").unwrap();
        match form {
            Form::List(elements, _) => {
                assert_eq!(elements[0], Form::Symbol(Symbol::intern_bare("fn")));
                match &elements[1] {
                    Form::Vector(params) => assert_eq!(params.len(), 1),
                    other => panic!("expected vector, got {other:?}"),
                }
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn numbered_percent_args_produce_k_params_in_order() {
        let form = read_string("#(+ %1 %2)").unwrap();
        match form {
            Form::List(elements, _) => match &elements[1] {
                Form::Vector(params) => assert_eq!(params.len(), 2),
                other => panic!("expected vector, got {other:?}"),
            },
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn skipped_positions_still_get_a_fresh_param() {
        // only %2 referenced; p1 must still appear as a fresh gensym.
        let form = read_string("#(+ %2)").unwrap();
        match form {
            Form::List(elements, _) => match &elements[1] {
                Form::Vector(params) => assert_eq!(params.len(), 2),
                other => panic!("expected vector, got {other:?}"),
            },
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn percent_ampersand_appends_rest_param() {
        let form = read_string("#(apply + %&)").unwrap();
        match form {
            Form::List(elements, _) => match &elements[1] {
                Form::Vector(params) => {
                    assert_eq!(params.len(), 2);
                    assert_eq!(params[0], Form::Symbol(Symbol::intern_bare("&")));
                }
                other => panic!("expected vector, got {other:?}"),
            },
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn nested_anon_fn_is_rejected() {
        let err = read_string("#(#(+ %1))").unwrap_err();
        assert!(err.message.contains("Nested"));
    }

    #[test]
    fn percent_outside_anon_fn_is_an_ordinary_symbol() {
        let form = read_string("%").unwrap();
        assert_eq!(form, Form::Symbol(Symbol::intern_bare("%")));
    }

    #[test]
    fn bad_arg_literal_is_an_error() {
        let err = read_string("#(+ %:foo)").unwrap_err();
        assert!(err.message.contains("arg literal"));
    }
}
