//! Numeric literal recognition.
//!
//! Plain scalars are offered to [`to_number`] before the constant table.
//! Accepted forms are hexadecimal (`0x7B`), octal (`0o17` or `017`), and
//! decimal with an optional fraction and exponent. A fraction or exponent
//! makes the literal floating point; every other form is an integer that
//! narrows to 32 bits when it fits.

use std::sync::LazyLock;

use regex::Regex;

use crate::value::Number;

static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\+?(-)?(?:",
        r"0x([0-9a-fA-F]+)",
        r"|0o?([1-7][0-7]*)",
        r"|(0|[1-9][0-9]*)?(\.[0-9]+)?([eE][-+]?[0-9]+)?",
        r")$"
    ))
    .expect("number pattern is valid")
});

const GROUP_MINUS: usize = 1;
const GROUP_HEX: usize = 2;
const GROUP_OCTAL: usize = 3;
const GROUP_INTEGER: usize = 4;
const GROUP_FRACTION: usize = 5;
const GROUP_EXPONENT: usize = 6;

/// Recognize `text` as a number literal.
///
/// Returns `None` for anything that is not entirely a number, including
/// integers that overflow 64 bits.
pub fn to_number(text: &str) -> Option<Number> {
    if !looks_numeric(text) {
        return None;
    }
    let caps = NUMBER_PATTERN.captures(text)?;
    let minus = caps.get(GROUP_MINUS).map_or("", |m| m.as_str());

    if let Some(hex) = caps.get(GROUP_HEX) {
        return parse_integer(minus, hex.as_str(), 16);
    }
    if let Some(octal) = caps.get(GROUP_OCTAL) {
        return parse_integer(minus, octal.as_str(), 8);
    }

    let integer = caps.get(GROUP_INTEGER).map(|m| m.as_str());
    let fraction = caps.get(GROUP_FRACTION).map(|m| m.as_str());
    let exponent = caps.get(GROUP_EXPONENT).map(|m| m.as_str());
    match (integer, fraction, exponent) {
        (None, None, _) => None,
        (Some(int), None, None) => parse_integer(minus, int, 10),
        (int, frac, exp) => {
            let literal = format!(
                "{}{}{}{}",
                minus,
                int.unwrap_or(""),
                frac.unwrap_or(""),
                exp.unwrap_or("")
            );
            literal.parse::<f64>().ok().map(Number::Float)
        }
    }
}

/// Cheap rejection before the full grammar runs: after at most two leading
/// `-`/`.` characters a digit or `+` must follow.
fn looks_numeric(text: &str) -> bool {
    let mut chars = text.chars();
    let mut first = chars.next();
    for _ in 0..2 {
        if matches!(first, Some('-' | '.')) {
            first = chars.next();
        }
    }
    matches!(first, Some('0'..='9' | '+'))
}

fn parse_integer(minus: &str, digits: &str, radix: u32) -> Option<Number> {
    let n = i64::from_str_radix(&format!("{}{}", minus, digits), radix).ok()?;
    Some(match i32::try_from(n) {
        Ok(small) => Number::Int(small),
        Err(_) => Number::Long(n),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", Number::Int(0))]
    #[case("123", Number::Int(123))]
    #[case("-123", Number::Int(-123))]
    #[case("+7", Number::Int(7))]
    #[case("0o223", Number::Int(147))]
    #[case("010", Number::Int(8))]
    #[case("0x0123", Number::Int(291))]
    #[case("0x007BABE", Number::Int(0x7BABE))]
    #[case("-0x10", Number::Int(-16))]
    #[case("4294967296", Number::Long(4_294_967_296))]
    fn integers(#[case] text: &str, #[case] expected: Number) {
        assert_eq!(to_number(text), Some(expected));
    }

    #[rstest]
    #[case("1.234", 1.234)]
    #[case(".123", 0.123)]
    #[case("-.123", -0.123)]
    #[case("-0.12E-3", -0.00012)]
    #[case("1e+16", 1e16)]
    #[case("2e3", 2000.0)]
    fn floats(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(to_number(text), Some(Number::Float(expected)));
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("123abc")]
    #[case("2x3")]
    #[case("12.")]
    #[case(".")]
    #[case("+")]
    #[case("000.123")]
    #[case("0009")]
    #[case("08")]
    #[case("0x")]
    #[case("0x10.5")]
    #[case("1.2.3")]
    #[case("99999999999999999999")]
    fn rejected(#[case] text: &str) {
        assert_eq!(to_number(text), None);
    }

    #[test]
    fn integer_width_narrows() {
        assert_eq!(to_number("2147483647"), Some(Number::Int(i32::MAX)));
        assert_eq!(to_number("2147483648"), Some(Number::Long(2_147_483_648)));
        assert_eq!(to_number("-2147483648"), Some(Number::Int(i32::MIN)));
    }
}
