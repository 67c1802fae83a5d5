//! The reader's single error type.
//!
//! `spec.md` §6/§7 is explicit that there is exactly one error kind
//! ("ReaderException") carrying a human-readable message and the
//! `(line, col)` of the offending character. We follow that literally
//! rather than modeling the §7 taxonomy as separate enum variants the way
//! `faxc-util::error` does for its several independent error domains —
//! here the taxonomy is a classification of *messages*, not of types.

use thiserror::Error;

/// An error raised while reading a form, carrying the source position of
/// the character that triggered it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message} at {line}:{col}")]
pub struct ReaderError {
    pub message: String,
    pub line: u32,
    pub col: u32,
}

/// Result alias used throughout the reader.
pub type ReaderResult<T> = std::result::Result<T, ReaderError>;

impl ReaderError {
    /// Build an error with an explicit message and position.
    pub fn new(message: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            message: message.into(),
            line,
            col,
        }
    }

    pub fn eof_while_reading(line: u32, col: u32) -> Self {
        Self::new("EOF while reading", line, col)
    }

    pub fn eof_starting_at_line(start_line: u32, line: u32, col: u32) -> Self {
        Self::new(
            format!("EOF while reading starting at line {start_line}"),
            line,
            col,
        )
    }

    pub fn eof_in_string(line: u32, col: u32) -> Self {
        Self::new("EOF while reading string", line, col)
    }

    pub fn eof_in_regex(line: u32, col: u32) -> Self {
        Self::new("EOF while reading regex", line, col)
    }

    pub fn eof_in_character(line: u32, col: u32) -> Self {
        Self::new("EOF while reading character", line, col)
    }

    pub fn eof_in_unquote(line: u32, col: u32) -> Self {
        Self::new("EOF reading unquote", line, col)
    }

    pub fn invalid_number(token: &str, line: u32, col: u32) -> Self {
        Self::new(format!("Invalid number: {token}"), line, col)
    }

    pub fn ratio_divide_by_zero(line: u32, col: u32) -> Self {
        Self::new("Invalid number: division by zero in ratio", line, col)
    }

    pub fn unknown_symbol(token: &str, line: u32, col: u32) -> Self {
        Self::new(format!("Unknown symbol {token}"), line, col)
    }

    pub fn unmatched_delimiter(delim: char, line: u32, col: u32) -> Self {
        Self::new(
            format!("Unmatched delimiter {delim} at {line}:{col}"),
            line,
            col,
        )
    }

    pub fn odd_map_entries(line: u32, col: u32) -> Self {
        Self::new("Map literal must contain an even number of forms", line, col)
    }

    pub fn duplicate_set_element(line: u32, col: u32) -> Self {
        Self::new("Duplicate set element", line, col)
    }

    pub fn no_dispatch_macro(ch: char, line: u32, col: u32) -> Self {
        Self::new(format!("No dispatch macro for: ({ch})"), line, col)
    }

    pub fn bad_escape(ch: char, line: u32, col: u32) -> Self {
        Self::new(
            format!("Unsupported escape character in literal string: \\{ch}"),
            line,
            col,
        )
    }

    pub fn bad_character_escape(token: &str, line: u32, col: u32) -> Self {
        Self::new(format!("Unsupported character: \\{token}"), line, col)
    }

    pub fn invalid_unicode_length(token: &str, line: u32, col: u32) -> Self {
        Self::new(format!("Invalid character length: \\{token}"), line, col)
    }

    pub fn bad_hex_digit(got: char, line: u32, col: u32) -> Self {
        Self::new(
            format!("Hexadecimal digit expected in literal string, got: {got}"),
            line,
            col,
        )
    }

    pub fn octal_out_of_range(value: u32, line: u32, col: u32) -> Self {
        Self::new(
            format!(
                "Octal escape sequence in literal string must be in range [0, 377], got: {value:o}"
            ),
            line,
            col,
        )
    }

    pub fn surrogate_codepoint(line: u32, col: u32) -> Self {
        Self::new("Invalid character constant: surrogate codepoint", line, col)
    }

    pub fn metadata_target_unsupported(line: u32, col: u32) -> Self {
        Self::new("Cannot attach metadata to this form", line, col)
    }

    pub fn invalid_metadata(line: u32, col: u32) -> Self {
        Self::new("Metadata must be a Symbol, Keyword, String, or Map", line, col)
    }

    pub fn nested_anon_fn(line: u32, col: u32) -> Self {
        Self::new("Nested #()s are not allowed", line, col)
    }

    pub fn bad_arg_literal(line: u32, col: u32) -> Self {
        Self::new("arg literal must be %, %& or %integer", line, col)
    }

    pub fn gensym_outside_syntax_quote(line: u32, col: u32) -> Self {
        Self::new("Gensym literal not in syntax-quote", line, col)
    }

    pub fn splice_not_in_list(line: u32, col: u32) -> Self {
        Self::new("splice not in list", line, col)
    }

    pub fn no_namespace_in_syntax_quote(line: u32, col: u32) -> Self {
        Self::new("No namespace found in syntax quote", line, col)
    }

    pub fn reserved_namespace_qualifier(line: u32, col: u32) -> Self {
        Self::new("::namespace-qualified keyword has no resolver", line, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let e = ReaderError::new("boom", 3, 7);
        assert_eq!(e.to_string(), "boom at 3:7");
    }

    #[test]
    fn eof_starting_at_line_names_the_start() {
        let e = ReaderError::eof_starting_at_line(1, 5, 0);
        assert!(e.message.contains("starting at line 1"));
    }

    #[test]
    fn constructors_carry_position_through() {
        let e = ReaderError::invalid_number("1/0x", 2, 4);
        assert_eq!(e.line, 2);
        assert_eq!(e.col, 4);
    }
}
