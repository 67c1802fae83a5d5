//! The compiler/namespace collaborator the reader consults during
//! syntax-quote symbol resolution and `::keyword` auto-namespacing.
//!
//! `spec.md` §6 describes this only as "a lookup returning the current
//! namespace object... and the set of compiler-builtin symbols"; this trait
//! is the Rust realization of that collaborator interface, resolved per
//! `SPEC_FULL.md` §4's `::kw` decision.

use glyph_util::Symbol;

/// Namespace/builtin-set lookup consulted while reading `` `sym `` and
/// `::kw`.
pub trait CompilerEnv {
    /// The name of the namespace currently being compiled, if any.
    fn current_ns_name(&self) -> Option<&str>;

    /// Whether `sym` names a compiler builtin, which syntax-quote leaves
    /// unqualified (`(quote sym)`) rather than namespace-resolving.
    fn is_builtin(&self, sym: &Symbol) -> bool;
}

/// A [`CompilerEnv`] with no namespace and no builtins.
///
/// Used by callers (like `read_string`) who just want literal-symbol
/// syntax-quote behavior without standing up a real compiler: every
/// bare, unqualified symbol fails to resolve, and every non-gensym,
/// non-dotted, non-namespaced symbol inside a syntax-quote errors with
/// "No namespace found in syntax quote" rather than silently qualifying.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCompilerEnv;

impl CompilerEnv for NullCompilerEnv {
    fn current_ns_name(&self) -> Option<&str> {
        None
    }

    fn is_builtin(&self, _sym: &Symbol) -> bool {
        false
    }
}

/// A [`CompilerEnv`] with a settable current namespace and a fixed builtin
/// set, suitable for tests and for `glyphc`'s default run mode.
#[derive(Debug, Clone)]
pub struct SimpleCompilerEnv {
    ns_name: Option<String>,
    builtins: std::collections::HashSet<Symbol>,
}

impl SimpleCompilerEnv {
    pub fn new(ns_name: impl Into<String>) -> Self {
        Self {
            ns_name: Some(ns_name.into()),
            builtins: std::collections::HashSet::new(),
        }
    }

    pub fn with_builtins(mut self, builtins: impl IntoIterator<Item = Symbol>) -> Self {
        self.builtins.extend(builtins);
        self
    }

    pub fn set_ns(&mut self, ns_name: impl Into<String>) {
        self.ns_name = Some(ns_name.into());
    }
}

impl CompilerEnv for SimpleCompilerEnv {
    fn current_ns_name(&self) -> Option<&str> {
        self.ns_name.as_deref()
    }

    fn is_builtin(&self, sym: &Symbol) -> bool {
        self.builtins.contains(sym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_env_has_no_namespace_or_builtins() {
        let env = NullCompilerEnv;
        assert_eq!(env.current_ns_name(), None);
        assert!(!env.is_builtin(&Symbol::intern_bare("if")));
    }

    #[test]
    fn simple_env_reports_configured_namespace() {
        let env = SimpleCompilerEnv::new("user");
        assert_eq!(env.current_ns_name(), Some("user"));
    }

    #[test]
    fn simple_env_recognizes_configured_builtins() {
        let if_sym = Symbol::intern_bare("if");
        let env = SimpleCompilerEnv::new("user").with_builtins([if_sym]);
        assert!(env.is_builtin(&if_sym));
        assert!(!env.is_builtin(&Symbol::intern_bare("def")));
    }

    #[test]
    fn set_ns_overrides_the_current_namespace() {
        let mut env = SimpleCompilerEnv::new("user");
        env.set_ns("other.ns");
        assert_eq!(env.current_ns_name(), Some("other.ns"));
    }
}
