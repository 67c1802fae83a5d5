//! String and character literal readers, including the unicode and octal
//! escape sequences they share.
//!
//! Corresponds to `spec.md` §4.6 (string reader) and §4.7 (character
//! reader), grounded in `lispreader.py`'s `stringReader`/`characterReader`/
//! `readUnicodeChar` trio. `readUnicodeChar`'s `exact` flag (string escapes
//! use exact-length `\u`/`\U`, bounded-length octal) is threaded through as
//! the `exact: bool` parameter on [`read_unicode_codepoint`].

use crate::form::Form;
use crate::reader::{is_macro, is_whitespace, read_raw_token};
use crate::stream::CharStream;
use glyph_util::{ReaderError, ReaderResult};

fn simple_escape(ch: char) -> Option<char> {
    match ch {
        't' => Some('\t'),
        'r' => Some('\r'),
        'n' => Some('\n'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        _ => None,
    }
}

fn is_octal_digit(ch: char) -> bool {
    ('0'..='7').contains(&ch)
}

/// Read `length` (if `exact`) or up to `length` (if not) more base-`base`
/// digits after `first_digit`, then parse the whole run as a codepoint.
/// Mirrors `readUnicodeChar`: a non-matching character under bounded mode
/// is pushed back and ends the run early; under exact mode it's an error.
fn read_unicode_codepoint<S: CharStream>(
    stream: &mut S,
    first_digit: char,
    base: u32,
    length: usize,
    exact: bool,
) -> ReaderResult<char> {
    let (line, col) = stream.line_col();
    let mut digits = String::new();
    digits.push(first_digit);

    for _ in 1..length {
        match stream.next_char() {
            None => break,
            Some(ch) if is_whitespace(ch) || is_macro(ch) => {
                stream.push_back();
                break;
            }
            Some(ch) if ch.is_digit(base) => digits.push(ch),
            Some(ch) => {
                if exact {
                    let (l, c) = stream.line_col();
                    return Err(ReaderError::bad_hex_digit(ch, l, c));
                }
                stream.push_back();
                break;
            }
        }
    }

    if exact && digits.len() != length {
        return Err(ReaderError::invalid_unicode_length(&digits, line, col));
    }

    let codepoint = u32::from_str_radix(&digits, base)
        .map_err(|_| ReaderError::invalid_unicode_length(&digits, line, col))?;

    if (0xD800..=0xDFFF).contains(&codepoint) {
        return Err(ReaderError::surrogate_codepoint(line, col));
    }

    char::from_u32(codepoint).ok_or_else(|| ReaderError::invalid_unicode_length(&digits, line, col))
}

/// Read a `"..."` string literal, the opening quote already consumed.
pub(crate) fn read_string_literal<S: CharStream>(stream: &mut S) -> ReaderResult<Form> {
    let mut out = String::new();
    loop {
        let (line, col) = stream.line_col();
        let ch = stream.next_char().ok_or_else(|| ReaderError::eof_in_string(line, col))?;

        if ch == '"' {
            return Ok(Form::string(out));
        }

        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let (eline, ecol) = stream.line_col();
        let esc = stream.next_char().ok_or_else(|| ReaderError::eof_in_string(eline, ecol))?;

        if let Some(simple) = simple_escape(esc) {
            out.push(simple);
            continue;
        }

        match esc {
            'u' => {
                let (l, c) = stream.line_col();
                let digit = stream.next_char().ok_or_else(|| ReaderError::eof_in_string(l, c))?;
                if !digit.is_ascii_hexdigit() {
                    let (l2, c2) = stream.line_col();
                    return Err(ReaderError::bad_hex_digit(digit, l2, c2));
                }
                out.push(read_unicode_codepoint(stream, digit, 16, 4, true)?);
            }
            'U' => {
                let (l, c) = stream.line_col();
                let digit = stream.next_char().ok_or_else(|| ReaderError::eof_in_string(l, c))?;
                if !digit.is_ascii_hexdigit() {
                    let (l2, c2) = stream.line_col();
                    return Err(ReaderError::bad_hex_digit(digit, l2, c2));
                }
                out.push(read_unicode_codepoint(stream, digit, 16, 8, true)?);
            }
            d if is_octal_digit(d) => {
                let ch = read_unicode_codepoint(stream, d, 8, 3, false)?;
                if (ch as u32) > 0o377 {
                    let (l, c) = stream.line_col();
                    return Err(ReaderError::octal_out_of_range(ch as u32, l, c));
                }
                out.push(ch);
            }
            other => return Err(ReaderError::bad_escape(other, eline, ecol)),
        }
    }
}

/// Read a `\x` character literal, the backslash already consumed.
pub(crate) fn read_character_literal<S: CharStream>(stream: &mut S) -> ReaderResult<Form> {
    let (line, col) = stream.line_col();
    let ch = stream.next_char().ok_or_else(|| ReaderError::eof_in_character(line, col))?;
    let token = read_raw_token(stream, ch);

    let mut chars = token.chars();
    let first = chars.next().expect("token is never empty");
    if chars.next().is_none() {
        return Ok(Form::Character(first));
    }

    match token.as_str() {
        "newline" => return Ok(Form::Character('\n')),
        "space" => return Ok(Form::Character(' ')),
        "tab" => return Ok(Form::Character('\t')),
        "backspace" => return Ok(Form::Character('\u{8}')),
        "formfeed" => return Ok(Form::Character('\u{c}')),
        "return" => return Ok(Form::Character('\r')),
        _ => {}
    }

    if let Some(rest) = token.strip_prefix('u') {
        if rest.len() == 4 && rest.chars().all(|c| c.is_ascii_hexdigit()) {
            let codepoint = u32::from_str_radix(rest, 16)
                .map_err(|_| ReaderError::invalid_unicode_length(&token, line, col))?;
            if (0xD800..=0xDFFF).contains(&codepoint) {
                return Err(ReaderError::surrogate_codepoint(line, col));
            }
            if let Some(c) = char::from_u32(codepoint) {
                return Ok(Form::Character(c));
            }
        }
        return Err(ReaderError::invalid_unicode_length(&token, line, col));
    }

    if let Some(rest) = token.strip_prefix('o') {
        if !rest.is_empty() && rest.len() <= 3 && rest.chars().all(is_octal_digit) {
            let codepoint = u32::from_str_radix(rest, 8)
                .map_err(|_| ReaderError::bad_character_escape(&token, line, col))?;
            if codepoint > 0o377 {
                return Err(ReaderError::octal_out_of_range(codepoint, line, col));
            }
            if let Some(c) = char::from_u32(codepoint) {
                return Ok(Form::Character(c));
            }
        }
        return Err(ReaderError::bad_character_escape(&token, line, col));
    }

    Err(ReaderError::bad_character_escape(&token, line, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StringStream;

    fn read_str(src: &str) -> Form {
        let mut stream = StringStream::new(&src[1..]);
        read_string_literal(&mut stream).unwrap()
    }

    fn read_char(src: &str) -> Form {
        let mut stream = StringStream::new(src);
        read_character_literal(&mut stream).unwrap()
    }

    #[test]
    fn plain_string_round_trips() {
        match read_str("\"hello\"") {
            Form::Str(s) => assert_eq!(&*s, "hello"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn escape_sequence_mix_matches_octal_and_unicode() {
        // \n \t \u0041 \101  -> newline, tab, 'A', 'A' (0o101 == 'A')
        match read_str("\"\\n\\t\\u0041\\101\"") {
            Form::Str(s) => assert_eq!(&*s, "\n\tAA"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn eof_inside_string_is_an_error() {
        let mut stream = StringStream::new("abc");
        let err = read_string_literal(&mut stream).unwrap_err();
        assert!(err.message.contains("EOF"));
    }

    #[test]
    fn octal_escape_over_377_is_rejected() {
        let mut stream = StringStream::new("\\777\"");
        let err = read_string_literal(&mut stream).unwrap_err();
        assert!(err.message.contains("Octal"));
    }

    #[test]
    fn single_character_literal() {
        assert_eq!(read_char("a"), Form::Character('a'));
    }

    #[test]
    fn named_character_literals() {
        assert_eq!(read_char("newline"), Form::Character('\n'));
        assert_eq!(read_char("space"), Form::Character(' '));
        assert_eq!(read_char("tab"), Form::Character('\t'));
    }

    #[test]
    fn unicode_character_literal() {
        assert_eq!(read_char("u0041"), Form::Character('A'));
    }

    #[test]
    fn octal_character_literal() {
        assert_eq!(read_char("o101"), Form::Character('A'));
    }

    #[test]
    fn invalid_unicode_length_is_an_error() {
        let mut stream = StringStream::new("u12");
        let err = read_character_literal(&mut stream).unwrap_err();
        assert!(err.message.contains("length"));
    }
}
