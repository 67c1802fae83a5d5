//! The form tree the reader produces.
//!
//! `Form` is a tagged sum, never a class hierarchy: reader output is always a
//! tree (cycles are impossible to construct), so plain recursive `enum`
//! variants are enough. List/Vector/Map/Set hold `Rc`-shared contents rather
//! than a persistent-collection crate — see `DESIGN.md` for why — which
//! means cloning a form is always a handful of refcount bumps, never a deep
//! copy.

use glyph_util::{Keyword, Symbol};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A compiled regex literal together with the source text it was compiled
/// from, since `regex::Regex` doesn't round-trip its source through
/// `Display` reliably enough to reprint.
#[derive(Debug)]
pub struct CompiledRegex {
    pub source: String,
    pub pattern: regex::Regex,
}

/// A metadata map attached to a form. Keyed on `Form` itself (matching the
/// `{:tag meta-form}` / `{meta-form true}` shapes the meta reader builds),
/// so it shares the same `Rc<BTreeMap<..>>` representation as `Form::Map`.
pub type MetaMap = Rc<std::collections::BTreeMap<Form, Form>>;

/// One node of the reader's output tree.
///
/// Equality and ordering are structural and ignore a `List`'s attached
/// metadata (so two lists with the same elements but different `:line`
/// values compare equal) — matching value semantics for the surrounding
/// persistent-collection runtime.
#[derive(Clone, Debug)]
pub enum Form {
    Nil,
    Bool(bool),
    Integer(BigInt),
    Ratio(BigRational),
    Float(f64),
    Str(Rc<str>),
    Character(char),
    Symbol(Symbol),
    Keyword(Keyword),
    List(Rc<Vec<Form>>, Option<MetaMap>),
    Vector(Rc<Vec<Form>>),
    Map(Rc<std::collections::BTreeMap<Form, Form>>),
    Set(Rc<std::collections::BTreeSet<Form>>),
    Regex(Rc<CompiledRegex>),
}

/// Discriminant rank used to order forms of different variants. The actual
/// values are arbitrary as long as they're stable; only relative order
/// matters since nothing outside this module inspects them.
fn rank(form: &Form) -> u8 {
    match form {
        Form::Nil => 0,
        Form::Bool(_) => 1,
        Form::Integer(_) => 2,
        Form::Ratio(_) => 3,
        Form::Float(_) => 4,
        Form::Str(_) => 5,
        Form::Character(_) => 6,
        Form::Symbol(_) => 7,
        Form::Keyword(_) => 8,
        Form::List(..) => 9,
        Form::Vector(_) => 10,
        Form::Map(_) => 11,
        Form::Set(_) => 12,
        Form::Regex(_) => 13,
    }
}

impl Form {
    /// A convenience constructor for a bare (non-metadata) list.
    pub fn list(elements: Vec<Form>) -> Form {
        Form::List(Rc::new(elements), None)
    }

    /// A list carrying a `{:line -> line}` metadata entry, as the list
    /// reader always attaches.
    pub fn list_with_line(elements: Vec<Form>, line: u32) -> Form {
        let mut meta = std::collections::BTreeMap::new();
        meta.insert(
            Form::Keyword(Keyword::intern_bare("line")),
            Form::Integer(BigInt::from(line)),
        );
        Form::List(Rc::new(elements), Some(Rc::new(meta)))
    }

    pub fn vector(elements: Vec<Form>) -> Form {
        Form::Vector(Rc::new(elements))
    }

    pub fn map(entries: std::collections::BTreeMap<Form, Form>) -> Form {
        Form::Map(Rc::new(entries))
    }

    pub fn set(elements: std::collections::BTreeSet<Form>) -> Form {
        Form::Set(Rc::new(elements))
    }

    pub fn string(s: impl Into<Rc<str>>) -> Form {
        Form::Str(s.into())
    }

    /// `true` for everything except `nil` and `false`, matching the
    /// surrounding language's truthiness (not used by the reader itself,
    /// but required by anything printing or further processing forms).
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Form::Nil | Form::Bool(false))
    }

    /// The metadata map attached to this form, if any. Only `List` carries
    /// one in this reader (see `spec.md` §4.12): the meta reader fails for
    /// every other target.
    pub fn metadata(&self) -> Option<&MetaMap> {
        match self {
            Form::List(_, meta) => meta.as_ref(),
            _ => None,
        }
    }

    /// Returns a copy of this form with its metadata replaced. Only
    /// supported for forms that can carry metadata.
    pub fn with_metadata(&self, meta: MetaMap) -> Option<Form> {
        match self {
            Form::List(elements, _) => Some(Form::List(Rc::clone(elements), Some(meta))),
            _ => None,
        }
    }

    /// The elements of a list/vector/set, or the flattened `k1 v1 k2 v2 ...`
    /// entries of a map, in iteration order. Used by the syntax-quote
    /// engine, which treats all four collection kinds as sequences.
    pub fn as_sequence(&self) -> Option<Vec<Form>> {
        match self {
            Form::List(elements, _) | Form::Vector(elements) => Some((**elements).clone()),
            Form::Set(elements) => Some(elements.iter().cloned().collect()),
            Form::Map(entries) => {
                let mut out = Vec::with_capacity(entries.len() * 2);
                for (k, v) in entries.iter() {
                    out.push(k.clone());
                    out.push(v.clone());
                }
                Some(out)
            }
            _ => None,
        }
    }
}

impl PartialEq for Form {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Form {}

impl PartialOrd for Form {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Form {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Form::Nil, Form::Nil) => Ordering::Equal,
            (Form::Bool(a), Form::Bool(b)) => a.cmp(b),
            (Form::Integer(a), Form::Integer(b)) => a.cmp(b),
            (Form::Ratio(a), Form::Ratio(b)) => a.cmp(b),
            (Form::Float(a), Form::Float(b)) => a.total_cmp(b),
            (Form::Str(a), Form::Str(b)) => a.cmp(b),
            (Form::Character(a), Form::Character(b)) => a.cmp(b),
            (Form::Symbol(a), Form::Symbol(b)) => a.cmp(b),
            (Form::Keyword(a), Form::Keyword(b)) => a.cmp(b),
            (Form::List(a, _), Form::List(b, _)) => a.cmp(b),
            (Form::Vector(a), Form::Vector(b)) => a.cmp(b),
            (Form::Map(a), Form::Map(b)) => a.cmp(b),
            (Form::Set(a), Form::Set(b)) => a.cmp(b),
            (Form::Regex(a), Form::Regex(b)) => a.source.cmp(&b.source),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Nil => write!(f, "nil"),
            Form::Bool(b) => write!(f, "{b}"),
            Form::Integer(i) => write!(f, "{i}"),
            Form::Ratio(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Form::Float(v) => write!(f, "{v}"),
            Form::Str(s) => write!(f, "{s:?}"),
            Form::Character(c) => write!(f, "\\{c}"),
            Form::Symbol(s) => write!(f, "{s}"),
            Form::Keyword(k) => write!(f, "{k}"),
            Form::List(elements, _) => {
                write!(f, "(")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
            Form::Vector(elements) => {
                write!(f, "[")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
            Form::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k} {v}")?;
                }
                write!(f, "}}")
            }
            Form::Set(elements) => {
                write!(f, "#{{")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "}}")
            }
            Form::Regex(r) => write!(f, "#{:?}", r.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_order_without_panicking_on_nan() {
        let nan = Form::Float(f64::NAN);
        let zero = Form::Float(0.0);
        assert!(nan.partial_cmp(&zero).is_some());
    }

    #[test]
    fn list_equality_ignores_metadata() {
        let a = Form::list_with_line(vec![Form::Integer(BigInt::from(1))], 1);
        let b = Form::list_with_line(vec![Form::Integer(BigInt::from(1))], 99);
        assert_eq!(a, b);
    }

    #[test]
    fn different_variants_compare_by_rank() {
        assert!(Form::Nil < Form::Bool(false));
        assert!(Form::Bool(true) < Form::Integer(BigInt::from(0)));
    }

    #[test]
    fn regex_ordering_uses_source_text() {
        let a = Form::Regex(Rc::new(CompiledRegex {
            source: "a".to_string(),
            pattern: regex::Regex::new("a").unwrap(),
        }));
        let b = Form::Regex(Rc::new(CompiledRegex {
            source: "b".to_string(),
            pattern: regex::Regex::new("b").unwrap(),
        }));
        assert!(a < b);
    }

    #[test]
    fn map_as_sequence_flattens_key_value_pairs() {
        let mut m = std::collections::BTreeMap::new();
        m.insert(
            Form::Keyword(Keyword::intern_bare("a")),
            Form::Integer(BigInt::from(1)),
        );
        let form = Form::map(m);
        let seq = form.as_sequence().unwrap();
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn display_round_trips_simple_list() {
        let l = Form::list(vec![Form::Integer(BigInt::from(1)), Form::Integer(BigInt::from(2))]);
        assert_eq!(l.to_string(), "(1 2)");
    }
}
