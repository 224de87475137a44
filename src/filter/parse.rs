//! Lenient value parsers for athlete attribute strings.
//!
//! Attribute values arrive as raw strings from the source system and may be
//! blank or garbage. Parsers return `None` instead of erroring; a predicate
//! over an unparsable value simply fails.

/// Parse a numeric attribute value. Non-finite results are rejected so a
/// stray "inf" in the data cannot satisfy a range.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a formatted height string into total inches.
///
/// Accepts the feet/inches forms the source system produces: `6'3"`,
/// `6' 3"`, `6'3`, `6'`, and a bare feet value like `6`.
pub(crate) fn parse_height_inches(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (feet_part, inches_part) = match raw.split_once('\'') {
        Some((feet, rest)) => (feet, rest.trim().trim_end_matches('"').trim()),
        None => (raw, ""),
    };

    let feet: i64 = feet_part.trim().parse().ok()?;
    let inches: i64 = if inches_part.is_empty() {
        0
    } else {
        inches_part.parse().ok()?
    };

    if feet < 0 || inches < 0 {
        return None;
    }
    Some(feet * 12 + inches)
}
