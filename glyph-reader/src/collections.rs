//! List, vector, and map readers, all built on one delimited-list scan.
//!
//! Corresponds to `spec.md` §4.10, grounded in `lispreader.py`'s
//! `readDelimitedList`, which every bracketed-collection reader (including
//! the set reader in `dispatch.rs`) calls through.

use crate::compiler_env::CompilerEnv;
use crate::reader::{is_macro, is_whitespace, read, ReaderContext};
use crate::stream::CharStream;
use glyph_util::ReaderError;
use glyph_util::ReaderResult;
use crate::form::Form;

/// Read forms until `delim` is seen (consuming it), skipping whitespace
/// between them and invoking macro characters along the way exactly as the
/// top-level reader does. `start_line`/`start_col` name the position of the
/// opening delimiter, reported if the stream runs out first.
pub(crate) fn read_delimited_list<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
    delim: char,
    start_line: u32,
) -> ReaderResult<Vec<Form>> {
    let mut out = Vec::new();
    loop {
        let mut ch = match stream.next_char() {
            Some(c) => c,
            None => {
                let (line, col) = stream.line_col();
                return Err(ReaderError::eof_starting_at_line(start_line, line, col));
            }
        };

        while is_whitespace(ch) {
            ch = match stream.next_char() {
                Some(c) => c,
                None => {
                    let (line, col) = stream.line_col();
                    return Err(ReaderError::eof_starting_at_line(start_line, line, col));
                }
            };
        }

        if ch == delim {
            return Ok(out);
        }

        if is_macro(ch) {
            match crate::reader::dispatch_one(ch, stream, ctx)? {
                Some(form) => {
                    out.push(form);
                    continue;
                }
                None => continue,
            }
        }

        stream.push_back();
        out.push(read(stream, ctx, true, Form::Nil)?);
    }
}

/// `(...)`: a list with a `{:line -> N}` metadata entry recording the
/// opening paren's line.
pub(crate) fn read_list<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<Form> {
    let (start_line, _) = stream.line_col();
    let elements = read_delimited_list(stream, ctx, ')', start_line)?;
    Ok(Form::list_with_line(elements, start_line))
}

/// `[...]`.
pub(crate) fn read_vector<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<Form> {
    let (start_line, _) = stream.line_col();
    let elements = read_delimited_list(stream, ctx, ']', start_line)?;
    Ok(Form::vector(elements))
}

/// `{...}`: must contain an even number of forms (key/value pairs).
pub(crate) fn read_map<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<Form> {
    let (start_line, start_col) = stream.line_col();
    let elements = read_delimited_list(stream, ctx, '}', start_line)?;
    if elements.len() % 2 != 0 {
        return Err(ReaderError::odd_map_entries(start_line, start_col));
    }
    let mut map = std::collections::BTreeMap::new();
    let mut iter = elements.into_iter();
    while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
        map.insert(k, v);
    }
    Ok(Form::map(map))
}

/// `#{...}`: reached via the dispatch reader, which consumes `#{` itself
/// and hands us the stream positioned right after the `{`. Rejects
/// duplicate elements.
pub(crate) fn read_set<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<Form> {
    let (start_line, start_col) = stream.line_col();
    let elements = read_delimited_list(stream, ctx, '}', start_line)?;
    let mut set = std::collections::BTreeSet::new();
    for element in elements {
        if !set.insert(element) {
            return Err(ReaderError::duplicate_set_element(start_line, start_col));
        }
    }
    Ok(Form::set(set))
}
