//! Canonical JSON serialization used as the equality contract of all detectors.
//!
//! Two values are equal iff their canonical forms are byte-identical:
//!
//! - object keys are emitted in sorted order, so key order never matters;
//! - array elements keep their order, so reordering a list is a change;
//! - integral floats are emitted like integers (`50.0` equals `50`, `-0.0`
//!   equals `0`);
//! - an absent value has no canonical form and equals only another absent
//!   value (absent vs `null` is a change).

use serde_json::{Number, Value};
use std::fmt::Write as _;
use thiserror::Error;

/// Deepest nesting accepted before a value is declared uncomparable
pub const MAX_CANONICAL_DEPTH: usize = 64;

/// Largest integral float rendered in integer form (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalError {
    #[error("value nests deeper than {limit} levels")]
    TooDeep { limit: usize },
    #[error("failed to serialize string: {0}")]
    Serialize(String),
}

/// Canonical serialization of a JSON value
///
/// # Errors
///
/// - `TooDeep` if the value nests deeper than [`MAX_CANONICAL_DEPTH`]
/// - `Serialize` if a string cannot be escaped
pub fn canonical_json(value: &Value) -> Result<String, CanonicalError> {
    let mut out = String::new();
    write_canonical(value, 0, &mut out)?;
    Ok(out)
}

/// Compare two possibly-absent values under the canonical contract
///
/// # Errors
///
/// Propagates [`CanonicalError`] from either side; callers treat that as
/// "changed".
pub fn canonical_eq(a: Option<&Value>, b: Option<&Value>) -> Result<bool, CanonicalError> {
    match (a, b) {
        (None, None) => Ok(true),
        (Some(a), Some(b)) => Ok(canonical_json(a)? == canonical_json(b)?),
        // Still canonicalize the present side so an uncomparable value is
        // reported even when the other side is absent.
        (Some(v), None) | (None, Some(v)) => canonical_json(v).map(|_| false),
    }
}

fn write_canonical(value: &Value, depth: usize, out: &mut String) -> Result<(), CanonicalError> {
    if depth > MAX_CANONICAL_DEPTH {
        return Err(CanonicalError::TooDeep {
            limit: MAX_CANONICAL_DEPTH,
        });
    }
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_string(s, out)?,
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, depth + 1, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out)?;
                out.push(':');
                write_canonical(&map[key.as_str()], depth + 1, out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_number(n: &Number, out: &mut String) {
    if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
        if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
            let _ = write!(out, "{}", f as i64);
            return;
        }
    }
    let _ = write!(out, "{}", n);
}

fn write_string(s: &str, out: &mut String) -> Result<(), CanonicalError> {
    let escaped = serde_json::to_string(s).map_err(|e| CanonicalError::Serialize(e.to_string()))?;
    out.push_str(&escaped);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested(depth: usize) -> Value {
        (0..depth).fold(json!("leaf"), |acc, _| json!([acc]))
    }

    #[test]
    fn test_object_key_order_is_insignificant() {
        let a: Value = serde_json::from_str(r#"{"b":1,"a":{"y":2,"x":3}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a":{"x":3,"y":2},"b":1}"#).unwrap();
        assert!(canonical_eq(Some(&a), Some(&b)).unwrap());
        assert_eq!(canonical_json(&a).unwrap(), r#"{"a":{"x":3,"y":2},"b":1}"#);
    }

    #[test]
    fn test_array_order_is_significant() {
        let a = json!(["AV", "Catering"]);
        let b = json!(["Catering", "AV"]);
        assert!(!canonical_eq(Some(&a), Some(&b)).unwrap());
    }

    #[test]
    fn test_integral_floats_equal_integers() {
        assert!(canonical_eq(Some(&json!(50)), Some(&json!(50.0))).unwrap());
        assert!(canonical_eq(Some(&json!(0)), Some(&json!(-0.0))).unwrap());
        assert!(!canonical_eq(Some(&json!(50)), Some(&json!(50.5))).unwrap());
    }

    #[test]
    fn test_absent_differs_from_null_and_matches_absent() {
        assert!(canonical_eq(None, None).unwrap());
        assert!(!canonical_eq(None, Some(&Value::Null)).unwrap());
        assert!(!canonical_eq(Some(&json!("")), None).unwrap());
    }

    #[test]
    fn test_strings_are_escaped() {
        assert_eq!(canonical_json(&json!("a\"b")).unwrap(), r#""a\"b""#);
    }

    #[test]
    fn test_too_deep_is_an_error_not_a_panic() {
        let deep = nested(MAX_CANONICAL_DEPTH + 5);
        assert_eq!(
            canonical_json(&deep),
            Err(CanonicalError::TooDeep {
                limit: MAX_CANONICAL_DEPTH
            })
        );
        assert!(canonical_eq(Some(&deep), None).is_err());
        assert!(canonical_json(&nested(MAX_CANONICAL_DEPTH)).is_ok());
    }
}
