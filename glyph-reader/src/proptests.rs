//! Property-based tests for the round-trip and number-equivalence
//! properties `spec.md` §8 lists, grounded in `faxc-lex::lexer`'s
//! `proptest!`-per-fixed-strategy style (property tests live alongside unit
//! tests rather than in a separate `tests/` directory, matching that
//! crate's `#[cfg(test)]` placement).

use crate::reader::read_string;
use num_bigint::BigInt;
use proptest::prelude::*;

proptest! {
    /// Leading whitespace and commas before a form never change what's read
    /// (`spec.md` §8: "Whitespace/commas between top-level forms never
    /// change the forms read").
    #[test]
    fn leading_whitespace_and_commas_do_not_change_the_form(
        padding in "[ \t\n,]{0,20}",
    ) {
        let with_padding = format!("{padding}42");
        prop_assert_eq!(read_string(&with_padding).unwrap(), read_string("42").unwrap());
    }

    /// Decimal, hex, and octal spellings of the same non-negative integer
    /// all read to equal values (`spec.md` §8's `10 = 0xa = 012` family).
    #[test]
    fn hex_and_octal_spellings_agree_with_decimal(n in 1u32..512) {
        let decimal = read_string(&n.to_string()).unwrap();
        let hex = read_string(&format!("0x{n:x}")).unwrap();
        let octal = read_string(&format!("0{n:o}")).unwrap();
        prop_assert_eq!(&decimal, &hex);
        prop_assert_eq!(&decimal, &octal);
    }

    /// An arbitrary base between 2 and 36 spells the same value as decimal.
    #[test]
    fn radix_spelling_agrees_with_decimal(n in 0u32..1000, base in 2u32..=36) {
        let decimal = read_string(&n.to_string()).unwrap();
        let digits = to_radix_digits(n, base);
        let radix = read_string(&format!("{base}r{digits}")).unwrap();
        prop_assert_eq!(decimal, radix);
    }

    /// A ratio always reads back equal to the `BigRational` built directly
    /// from the same numerator/denominator (reduction to lowest terms is
    /// `num-rational`'s job, not the reader's, but the reader must preserve
    /// the value either way).
    #[test]
    fn ratio_value_matches_numerator_over_denominator(
        numer in 0u32..10_000,
        denom in 1u32..10_000,
    ) {
        use num_rational::BigRational;
        let form = read_string(&format!("{numer}/{denom}")).unwrap();
        let expected = crate::form::Form::Ratio(BigRational::new(
            BigInt::from(numer),
            BigInt::from(denom),
        ));
        prop_assert_eq!(form, expected);
    }

    /// A plain string literal containing no backslash or quote round-trips
    /// character-for-character.
    #[test]
    fn unescaped_string_literals_round_trip(s in "[a-zA-Z0-9 ]{0,40}") {
        let source = format!("\"{s}\"");
        match read_string(&source).unwrap() {
            crate::form::Form::Str(read_back) => prop_assert_eq!(&*read_back, s.as_str()),
            other => prop_assert!(false, "expected a string, got {other:?}"),
        }
    }

    /// A bare lowercase token (never `nil`/`true`/`false`, which are handled
    /// specially) always reads back as a bare symbol with that exact name.
    #[test]
    fn bare_lowercase_tokens_read_as_symbols(
        name in "[a-z][a-z0-9]{0,15}",
    ) {
        prop_assume!(!matches!(name.as_str(), "nil" | "true" | "false"));
        match read_string(&name).unwrap() {
            crate::form::Form::Symbol(sym) => {
                prop_assert!(sym.is_bare());
                prop_assert_eq!(sym.name(), name.as_str());
            }
            other => prop_assert!(false, "expected a symbol, got {other:?}"),
        }
    }
}

/// Render `n` in `base` using the reader's accepted digit alphabet
/// (`0-9a-z`), for building `<base>r<digits>` test inputs.
fn to_radix_digits(n: u32, base: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    let mut n = n;
    while n > 0 {
        let d = n % base;
        let ch = std::char::from_digit(d, base).expect("digit within base");
        digits.push(ch);
        n /= base;
    }
    digits.reverse();
    digits.into_iter().collect()
}
