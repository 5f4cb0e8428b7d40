//! Numeric literal parsing shared by the `int`/`float` tests, range tests and
//! the statistical profile.
//!
//! Literals follow the forgiving conventions of hand-edited data files:
//! surrounding whitespace is ignored and single underscores may separate
//! digits (`1_000`).

/// Remove digit-group underscores. Returns `None` when an underscore is not
/// surrounded by two digits of the given radix.
fn strip_underscores(digits: &str, radix: u32) -> Option<String> {
    if !digits.contains('_') {
        return Some(digits.to_string());
    }
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            let before = i > 0 && chars[i - 1].is_digit(radix);
            let after = chars.get(i + 1).is_some_and(|n| n.is_digit(radix));
            if !before || !after {
                return None;
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

/// Parse a base-10 integer literal, allowing leading zeros.
pub(crate) fn parse_decimal_int(value: &str) -> Option<i128> {
    let (negative, body) = split_sign(value.trim());
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return None;
    }
    let digits = strip_underscores(body, 10)?;
    let magnitude: i128 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Check an integer literal with radix auto-detection.
///
/// Accepts `0x`/`0o`/`0b` prefixes (an underscore may follow the prefix);
/// decimal literals may not carry leading zeros unless every digit is zero.
pub(crate) fn is_auto_radix_int(value: &str) -> bool {
    let (_, body) = split_sign(value.trim());
    if body.is_empty() {
        return false;
    }

    let lower = body.to_ascii_lowercase();
    let prefixed = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find(|(prefix, _)| lower.starts_with(prefix));

    if let Some((prefix, radix)) = prefixed {
        let rest = &body[prefix.len()..];
        let rest = rest.strip_prefix('_').unwrap_or(rest);
        if rest.is_empty() || !rest.chars().all(|c| c.is_digit(radix) || c == '_') {
            return false;
        }
        return strip_underscores(rest, radix).is_some();
    }

    if !body.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return false;
    }
    let Some(digits) = strip_underscores(body, 10) else {
        return false;
    };
    !(digits.len() > 1 && digits.starts_with('0') && digits.chars().any(|c| c != '0'))
}

/// Parse a floating point literal, including `inf`, `infinity` and `nan`
/// spellings in any case.
pub(crate) fn parse_float(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned = strip_underscores(trimmed, 10)?;
    cleaned.parse::<f64>().ok()
}
