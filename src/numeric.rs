use once_cell::sync::Lazy;
use regex::Regex;

/// A token that may be a signed amount: digits, separators, parentheses.
static SIGNED_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[(\d,.)]+$").unwrap());
/// A token that may be an unsigned figure (NAV, unit balance).
static UNSIGNED_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d,.]+$").unwrap());

/// Parses a statement figure such as `1,234.50` or `(1,234.50)`.
///
/// - Surrounding whitespace is trimmed
/// - `(X)` means `-X`
/// - Thousands separators are dropped before parsing
///
/// Returns `None` for empty or non-numeric input, never panics.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let mut value = value.trim();
    let negative = value.len() >= 2 && value.starts_with('(') && value.ends_with(')');
    if negative {
        value = &value[1..value.len() - 1];
    }
    let cleaned = value.replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    let parsed = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if negative { -parsed } else { parsed })
}

/// True if the token has the shape of a signed figure (may still fail to parse).
pub fn looks_signed(token: &str) -> bool {
    SIGNED_TOKEN.is_match(token)
}

/// True if the token has the shape of an unsigned figure.
pub fn looks_unsigned(token: &str) -> bool {
    UNSIGNED_TOKEN.is_match(token)
}
