//! Primitive (non-regex) named tests.

use serde::{Deserialize, Serialize};

use super::numeric::{is_auto_radix_int, parse_float};
use super::InputRepr;

/// Built-in character-class and conversion tests.
///
/// The `Bytes*` variants inspect the UTF-8 bytes of the value with
/// ASCII-only semantics; everything else works on text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Value must be empty.
    Nothing,
    /// Value must be non-empty.
    Something,
    /// Always passes.
    Anything,
    /// Integer literal with optional radix prefix.
    Int,
    /// Floating point literal.
    Float,
    IsDigit,
    IsDecimal,
    IsNumeric,
    IsLower,
    IsUpper,
    IsTitle,
    IsAlpha,
    IsAlnum,
    IsAscii,
    IsPrintable,
    BytesIsDigit,
    BytesIsLower,
    BytesIsUpper,
    BytesIsTitle,
    BytesIsAlpha,
    BytesIsAlnum,
    BytesIsAscii,
}

impl Primitive {
    /// Registry identifier and primitive, in registration order.
    pub const ALL: &'static [(&'static str, Primitive)] = &[
        ("nothing", Primitive::Nothing),
        ("something", Primitive::Something),
        ("anything", Primitive::Anything),
        ("int", Primitive::Int),
        ("float", Primitive::Float),
        ("b.isdigit", Primitive::BytesIsDigit),
        ("isdigit", Primitive::IsDigit),
        ("isdecimal", Primitive::IsDecimal),
        ("isnumeric", Primitive::IsNumeric),
        ("b.islower", Primitive::BytesIsLower),
        ("islower", Primitive::IsLower),
        ("b.isupper", Primitive::BytesIsUpper),
        ("isupper", Primitive::IsUpper),
        ("b.istitle", Primitive::BytesIsTitle),
        ("istitle", Primitive::IsTitle),
        ("b.isalpha", Primitive::BytesIsAlpha),
        ("isalpha", Primitive::IsAlpha),
        ("b.isalnum", Primitive::BytesIsAlnum),
        ("isalnum", Primitive::IsAlnum),
        ("isprintable", Primitive::IsPrintable),
        ("b.isascii", Primitive::BytesIsAscii),
        ("isascii", Primitive::IsAscii),
    ];

    /// Input representation this test expects.
    pub fn input(&self) -> InputRepr {
        match self {
            Primitive::BytesIsDigit
            | Primitive::BytesIsLower
            | Primitive::BytesIsUpper
            | Primitive::BytesIsTitle
            | Primitive::BytesIsAlpha
            | Primitive::BytesIsAlnum
            | Primitive::BytesIsAscii => InputRepr::Bytes,
            _ => InputRepr::Text,
        }
    }

    /// Run the test against a field value.
    pub fn test(&self, value: &str) -> bool {
        match self.input() {
            InputRepr::Bytes => self.test_bytes(value.as_bytes()),
            InputRepr::Text => self.test_text(value),
        }
    }

    fn test_text(&self, value: &str) -> bool {
        match self {
            Primitive::Nothing => value.is_empty(),
            Primitive::Something => !value.is_empty(),
            Primitive::Anything => true,
            Primitive::Int => is_auto_radix_int(value),
            Primitive::Float => parse_float(value).is_some(),
            Primitive::IsDigit | Primitive::IsDecimal => non_empty_all(value, |c| c.is_ascii_digit()),
            Primitive::IsNumeric => non_empty_all(value, char::is_numeric),
            Primitive::IsLower => {
                value.chars().any(is_cased) && !value.chars().any(char::is_uppercase)
            }
            Primitive::IsUpper => {
                value.chars().any(is_cased) && !value.chars().any(char::is_lowercase)
            }
            Primitive::IsTitle => is_title(value.chars(), char::is_uppercase, char::is_lowercase),
            Primitive::IsAlpha => non_empty_all(value, char::is_alphabetic),
            Primitive::IsAlnum => non_empty_all(value, char::is_alphanumeric),
            Primitive::IsAscii => value.is_ascii(),
            Primitive::IsPrintable => value
                .chars()
                .all(|c| c == ' ' || !(c.is_control() || c.is_whitespace())),
            _ => false,
        }
    }

    fn test_bytes(&self, value: &[u8]) -> bool {
        match self {
            Primitive::BytesIsDigit => !value.is_empty() && value.iter().all(u8::is_ascii_digit),
            Primitive::BytesIsLower => {
                value.iter().any(u8::is_ascii_lowercase) && !value.iter().any(u8::is_ascii_uppercase)
            }
            Primitive::BytesIsUpper => {
                value.iter().any(u8::is_ascii_uppercase) && !value.iter().any(u8::is_ascii_lowercase)
            }
            Primitive::BytesIsTitle => is_title(
                value.iter().map(|&b| b as char),
                |c| c.is_ascii_uppercase(),
                |c| c.is_ascii_lowercase(),
            ),
            Primitive::BytesIsAlpha => {
                !value.is_empty() && value.iter().all(u8::is_ascii_alphabetic)
            }
            Primitive::BytesIsAlnum => {
                !value.is_empty() && value.iter().all(u8::is_ascii_alphanumeric)
            }
            Primitive::BytesIsAscii => value.is_ascii(),
            _ => false,
        }
    }
}

fn non_empty_all(value: &str, pred: impl Fn(char) -> bool) -> bool {
    !value.is_empty() && value.chars().all(pred)
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// Title case: upper-case letters only follow uncased characters and
/// lower-case letters only follow cased ones; at least one cased letter.
fn is_title(
    chars: impl Iterator<Item = char>,
    is_upper: impl Fn(char) -> bool,
    is_lower: impl Fn(char) -> bool,
) -> bool {
    let mut cased = false;
    let mut previous_is_cased = false;
    for c in chars {
        if is_upper(c) {
            if previous_is_cased {
                return false;
            }
            previous_is_cased = true;
            cased = true;
        } else if is_lower(c) {
            if !previous_is_cased {
                return false;
            }
            previous_is_cased = true;
            cased = true;
        } else {
            previous_is_cased = false;
        }
    }
    cased
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_tests() {
        assert!(Primitive::Nothing.test(""));
        assert!(!Primitive::Nothing.test("x"));
        assert!(Primitive::Something.test("x"));
        assert!(!Primitive::Something.test(""));
        assert!(Primitive::Anything.test("whatever"));
    }

    #[test]
    fn test_case_tests() {
        assert!(Primitive::IsLower.test("abc 123"));
        assert!(!Primitive::IsLower.test("123"));
        assert!(!Primitive::IsLower.test("aBc"));
        assert!(Primitive::IsUpper.test("ABC-1"));
        assert!(Primitive::IsTitle.test("Hello World"));
        assert!(!Primitive::IsTitle.test("Hello world"));
        assert!(!Primitive::IsTitle.test("HEllo"));
        assert!(Primitive::BytesIsTitle.test("They're Here"));
    }

    #[test]
    fn test_byte_variants_are_ascii_only() {
        assert_eq!(Primitive::BytesIsAlpha.input(), InputRepr::Bytes);
        assert!(Primitive::IsAlpha.test("café"));
        assert!(!Primitive::BytesIsAlpha.test("café"));
        assert!(Primitive::BytesIsDigit.test("0123"));
        assert!(!Primitive::BytesIsAscii.test("é"));
    }

    #[test]
    fn test_numeric_tests() {
        assert!(Primitive::Int.test("0x1f"));
        assert!(!Primitive::Int.test("1.0"));
        assert!(Primitive::Float.test("1.0"));
        assert!(Primitive::Float.test("inf"));
        assert!(Primitive::IsNumeric.test("½"));
        assert!(!Primitive::IsDigit.test("½"));
        assert!(!Primitive::IsDigit.test(""));
    }

    #[test]
    fn test_printable() {
        assert!(Primitive::IsPrintable.test("plain text"));
        assert!(!Primitive::IsPrintable.test("tab\there"));
    }
}
