//! The `^` metadata reader.
//!
//! Corresponds to `spec.md` §4.12, grounded in `lispreader.py`'s
//! `metaReader`: reads a metadata form, normalizes it to a map, then attaches
//! it to the form that follows.

use crate::compiler_env::CompilerEnv;
use crate::form::Form;
use crate::reader::{read, ReaderContext};
use crate::stream::CharStream;
use glyph_util::{Keyword, ReaderError, ReaderResult};
use std::collections::BTreeMap;
use std::rc::Rc;

pub(crate) fn read_meta<S: CharStream, C: CompilerEnv>(
    stream: &mut S,
    ctx: &ReaderContext<C>,
) -> ReaderResult<Form> {
    let (meta_line, meta_col) = stream.line_col();
    let meta_form = read(stream, ctx, true, Form::Nil)?;
    let meta_map = normalize_meta(&meta_form, meta_line, meta_col)?;

    let (target_line, target_col) = stream.line_col();
    let target = read(stream, ctx, true, Form::Nil)?;
    target
        .with_metadata(Rc::new(meta_map))
        .ok_or_else(|| ReaderError::metadata_target_unsupported(target_line, target_col))
}

/// Normalize a metadata form to the `{:tag meta}` / `{meta true}` / raw-map
/// shapes `spec.md` §4.12 lists; anything else is an error.
fn normalize_meta(meta_form: &Form, line: u32, col: u32) -> ReaderResult<BTreeMap<Form, Form>> {
    match meta_form {
        Form::Symbol(_) | Form::Str(_) => {
            let mut map = BTreeMap::new();
            map.insert(Form::Keyword(Keyword::intern_bare("tag")), meta_form.clone());
            Ok(map)
        }
        Form::Keyword(_) => {
            let mut map = BTreeMap::new();
            map.insert(meta_form.clone(), Form::Bool(true));
            Ok(map)
        }
        Form::Map(entries) => Ok((**entries).clone()),
        _ => Err(ReaderError::invalid_metadata(line, col)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_string;

    #[test]
    fn keyword_meta_becomes_true_valued_entry() {
        let form = read_string("^:foo (bar)").unwrap();
        match form {
            Form::List(_, meta) => {
                let meta = meta.unwrap();
                assert_eq!(
                    meta.get(&Form::Keyword(Keyword::intern_bare("foo"))),
                    Some(&Form::Bool(true))
                );
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn symbol_meta_becomes_tag_entry() {
        let form = read_string("^String (bar)").unwrap();
        match form {
            Form::List(_, meta) => {
                let meta = meta.unwrap();
                assert!(meta.contains_key(&Form::Keyword(Keyword::intern_bare("tag"))));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn string_meta_becomes_tag_entry() {
        let form = read_string(r#"^"doc" (bar)"#).unwrap();
        match form {
            Form::List(_, meta) => {
                let meta = meta.unwrap();
                assert!(meta.contains_key(&Form::Keyword(Keyword::intern_bare("tag"))));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn map_meta_is_used_directly() {
        let form = read_string("^{:a 1} (bar)").unwrap();
        match form {
            Form::List(_, meta) => {
                let meta = meta.unwrap();
                assert_eq!(meta.len(), 1);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn integer_meta_is_an_error() {
        let err = read_string("^1 (bar)").unwrap_err();
        assert!(err.message.contains("Metadata"));
    }

    #[test]
    fn metadata_on_an_unsupported_target_is_an_error() {
        let err = read_string("^:foo 1").unwrap_err();
        assert!(err.message.contains("Cannot attach metadata"));
    }
}
