//! Number lexing: integer (radix/decimal/octal/hex), float, and ratio
//! literals.
//!
//! Corresponds to `spec.md` §4.5. The three patterns this module tries, in
//! order, mirror `original_source/clojure/lang/lispreader.py`'s `intPat`,
//! `floatPat`, and `ratioPat` regexes; rather than compile those patterns
//! with the `regex` crate (reserved for the `#"..."` reader literal, which
//! genuinely needs a user-supplied pattern at runtime), this is hand-rolled
//! scanning over a fixed, known grammar — exactly the kind of thing
//! `faxc-lex`'s `Cursor` does by hand rather than regex-matching tokens.

use crate::form::Form;
use crate::stream::CharStream;
use glyph_util::{ReaderError, ReaderResult};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use std::str::FromStr;

/// Read a number token starting at `initch` (already consumed from
/// `stream`), accumulating until whitespace, EOF, or any macro character
/// (even a non-terminating one — `spec.md` §4.5 is explicit that numbers
/// stop at every macro character, unlike plain tokens).
pub(crate) fn read_number<S: CharStream>(stream: &mut S, initch: char) -> ReaderResult<Form> {
    let mut buf = String::new();
    buf.push(initch);
    loop {
        match stream.next_char() {
            None => break,
            Some(ch) if crate::reader::is_whitespace(ch) || crate::reader::is_macro(ch) => {
                stream.push_back();
                break;
            }
            Some(ch) => buf.push(ch),
        }
    }

    let (line, col) = stream.line_col();
    match_number(&buf).map_err(|_| ReaderError::ratio_divide_by_zero(line, col))?
        .ok_or_else(|| ReaderError::invalid_number(&buf, line, col))
}

/// Try integer, then float, then ratio, returning `Ok(None)` if none match
/// (an invalid number), or `Err(())` specifically for ratio
/// division-by-zero, which is a distinct error message from "no pattern
/// matched".
fn match_number(s: &str) -> Result<Option<Form>, ()> {
    if let Some(form) = match_integer(s) {
        return Ok(Some(form));
    }
    if let Some(form) = match_float(s) {
        return Ok(Some(form));
    }
    match_ratio(s)
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'+') => (false, &s[1..]),
        Some(b'-') => (true, &s[1..]),
        _ => (false, s),
    }
}

fn match_integer(s: &str) -> Option<Form> {
    let (negative, rest) = split_sign(s);
    if rest.is_empty() {
        return None;
    }

    // radix: <base>r<digits> or <base>R<digits>, base in 2..=36
    if let Some(idx) = rest.find(['r', 'R']) {
        let (base_str, digits) = (&rest[..idx], &rest[idx + 1..]);
        if !base_str.is_empty()
            && base_str.chars().all(|c| c.is_ascii_digit())
            && !digits.is_empty()
        {
            if let Ok(base) = base_str.parse::<u32>() {
                if (2..=36).contains(&base) && digits.chars().all(|c| c.is_digit(base)) {
                    if let Some(mut value) = BigInt::parse_bytes(digits.as_bytes(), base) {
                        if negative {
                            value = -value;
                        }
                        return Some(Form::Integer(value));
                    }
                }
            }
        }
    }

    // hex: 0x or 0X followed by one or more hex digits
    if let Some(digits) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            let mut value = BigInt::parse_bytes(digits.as_bytes(), 16)?;
            if negative {
                value = -value;
            }
            return Some(Form::Integer(value));
        }
        return None;
    }

    // octal: 0 followed by one or more octal digits
    if rest.len() > 1 && rest.starts_with('0') && rest[1..].chars().all(|c| ('0'..='7').contains(&c)) {
        let mut value = BigInt::parse_bytes(rest[1..].as_bytes(), 8)?;
        if negative {
            value = -value;
        }
        return Some(Form::Integer(value));
    }

    // decimal: 0, or [1-9][0-9]*
    let is_decimal = rest == "0"
        || (rest.starts_with(|c: char| ('1'..='9').contains(&c))
            && rest.chars().all(|c| c.is_ascii_digit()));
    if is_decimal {
        let mut value = BigInt::from_str(rest).ok()?;
        if negative {
            value = -value;
        }
        return Some(Form::Integer(value));
    }

    None
}

fn match_float(s: &str) -> Option<Form> {
    let (_, rest) = split_sign(s);
    if rest.is_empty() || !rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let after_digits = &rest[digits_end..];

    let has_fraction_or_exponent = match after_digits.chars().next() {
        Some('.') => {
            let frac = &after_digits[1..];
            let frac_digits_end = frac
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(frac.len());
            let exponent = &frac[frac_digits_end..];
            exponent.is_empty() || is_valid_exponent(exponent)
        }
        Some('e') | Some('E') => is_valid_exponent(after_digits),
        _ => false,
    };

    if !has_fraction_or_exponent {
        return None;
    }

    s.parse::<f64>().ok().map(Form::Float)
}

fn is_valid_exponent(s: &str) -> bool {
    let Some(rest) = s.strip_prefix(['e', 'E']) else {
        return false;
    };
    let rest = rest.strip_prefix(['+', '-']).unwrap_or(rest);
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

fn match_ratio(s: &str) -> Result<Option<Form>, ()> {
    let (negative, rest) = split_sign(s);
    let Some(slash) = rest.find('/') else {
        return Ok(None);
    };
    let (num_str, den_str) = (&rest[..slash], &rest[slash + 1..]);
    if !is_ratio_component(num_str) || !is_ratio_component(den_str) {
        return Ok(None);
    }

    let Some(numer) = BigInt::from_str(num_str).ok() else {
        return Ok(None);
    };
    let Some(denom) = BigInt::from_str(den_str).ok() else {
        return Ok(None);
    };

    if denom.is_zero() {
        return Err(());
    }

    let numer = if negative { -numer } else { numer };
    Ok(Some(Form::Ratio(BigRational::new(numer, denom))))
}

fn is_ratio_component(s: &str) -> bool {
    s == "0" || (!s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) && !s.starts_with('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StringStream;

    fn read(src: &str) -> Form {
        let mut stream = StringStream::new(&src[1..]);
        let initch = src.chars().next().unwrap();
        read_number(&mut stream, initch).unwrap()
    }

    #[test]
    fn decimal_integers() {
        assert_eq!(read("0"), Form::Integer(BigInt::from(0)));
        assert_eq!(read("42"), Form::Integer(BigInt::from(42)));
        assert_eq!(read("-7"), Form::Integer(BigInt::from(-7)));
    }

    #[test]
    fn octal_hex_and_radix_all_equal_decimal() {
        let expected = Form::Integer(BigInt::from(10));
        assert_eq!(read("012"), expected);
        assert_eq!(read("0xa"), expected);
        assert_eq!(read("10r10"), expected);
    }

    #[test]
    fn float_forms() {
        assert_eq!(read("1e2"), Form::Float(100.0));
        assert_eq!(read("3.14"), Form::Float(3.14));
        assert_eq!(read("1."), Form::Float(1.0));
    }

    #[test]
    fn ratio_reduces_to_lowest_terms() {
        match read("2/4") {
            Form::Ratio(r) => assert_eq!(r, BigRational::new(BigInt::from(1), BigInt::from(2))),
            other => panic!("expected ratio, got {other:?}"),
        }
    }

    #[test]
    fn negative_ratio() {
        match read("-1/2") {
            Form::Ratio(r) => {
                assert_eq!(r, -BigRational::new(BigInt::from(1), BigInt::from(2)))
            }
            other => panic!("expected ratio, got {other:?}"),
        }
    }

    #[test]
    fn ratio_division_by_zero_is_an_error() {
        let mut stream = StringStream::new("/0");
        let err = read_number(&mut stream, '1').unwrap_err();
        assert!(err.message.contains("zero"));
    }

    #[test]
    fn invalid_number_is_an_error() {
        let mut stream = StringStream::new("x0");
        let err = read_number(&mut stream, '1').unwrap_err();
        assert!(err.message.contains("Invalid number"));
    }

    #[test]
    fn radix_base_out_of_range_is_invalid() {
        let mut stream = StringStream::new("r10");
        let err = read_number(&mut stream, '1').unwrap_err();
        assert!(err.message.contains("Invalid number"));
    }
}
