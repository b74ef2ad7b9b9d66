//! Lenient conversions from client-supplied JSON values.

use serde_json::Value;

/// Parse a value as a float, falling back to `0.0` when absent, unparseable,
/// or not finite.
pub fn float_or_zero(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    finite_or_zero(parsed)
}

/// NaN and infinities cannot be written back as JSON numbers; store them as `0.0`.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Parse a value as an integer. Floats are truncated toward zero.
///
/// Returns `None` for anything that does not read as a number in `i64` range.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn truncate(f: f64) -> Option<i64> {
    let f = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

/// Render a value as stored text: strings verbatim, `null` as empty, the rest as JSON.
pub fn text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Like [`text`], but keeps `null` as `None`.
pub fn optional_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(text(other)),
    }
}
