//! Shared infrastructure for the Glyph reader: symbol/keyword interning,
//! the gensym counter, and the reader's error type.
//!
//! Nothing in this crate depends on `glyph-reader` — it exists so that a
//! future compiler/runtime crate can share interning and error-reporting
//! machinery with the reader without depending on the reader itself.

pub mod error;
pub mod gensym;
pub mod intern;
pub mod symbol;

pub use error::{ReaderError, ReaderResult};
pub use gensym::GensymCounter;
pub use intern::Interned;
pub use symbol::{Keyword, Symbol};
