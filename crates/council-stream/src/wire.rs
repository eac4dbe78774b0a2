//! Lenient readers for payload fields the backend does not type consistently
//! (ids that are sometimes numbers, lists that are sometimes pre-joined
//! strings, costs that are sometimes strings).
//!
//! The `read_*` functions return `None` for a value of the wrong shape so the
//! caller can leave it untouched instead of rejecting the whole record.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn read_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

pub(crate) fn read_string_or_number(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A number, or a string holding one. Non-finite values are rejected.
pub(crate) fn read_cost(value: &Value) -> Option<f64> {
    let cost = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    cost.is_finite().then_some(cost)
}

/// Accepts `"a.txt, b.png"` as-is or `["a.txt", "b.png"]` joined with `", "`.
pub(crate) fn read_string_or_list(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .map(Value::as_str)
            .collect::<Option<Vec<_>>>()
            .map(|names| names.join(", ")),
        _ => None,
    }
}

/// A list of strings; non-string elements are skipped and a bare string is a
/// one-element list.
pub(crate) fn read_string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

/// Byte count from an integer, a non-negative float (rounded) or a numeric
/// string.
pub(crate) fn read_byte_size(value: &Value) -> Option<u64> {
    let size = match value {
        Value::Number(n) => match n.as_u64() {
            Some(size) => return Some(size),
            None => n.as_f64()?,
        },
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (size.is_finite() && size >= 0.0).then(|| size.round() as u64)
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    read_string_or_number(&value)
        .ok_or_else(|| D::Error::custom(format!("expected string or number, got {value}")))
}

/// Never fails: an unreadable value becomes `None`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(read_string(&Value::deserialize(deserializer)?))
}

/// Never fails: an unreadable size becomes 0.
pub(crate) fn lenient_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(read_byte_size(&Value::deserialize(deserializer)?).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_and_strings_become_strings() {
        assert_eq!(read_string_or_number(&json!(7)).as_deref(), Some("7"));
        assert_eq!(read_string_or_number(&json!("c-1")).as_deref(), Some("c-1"));
        assert_eq!(read_string_or_number(&json!(true)), None);
    }

    #[test]
    fn lists_are_joined() {
        assert_eq!(
            read_string_or_list(&json!(["a.txt", "b.png"])).as_deref(),
            Some("a.txt, b.png")
        );
        assert_eq!(read_string_or_list(&json!("a.txt")).as_deref(), Some("a.txt"));
        assert_eq!(read_string_or_list(&json!([1])), None);
    }

    #[test]
    fn costs_accept_numeric_strings() {
        assert_eq!(read_cost(&json!(0.25)), Some(0.25));
        assert_eq!(read_cost(&json!(2)), Some(2.0));
        assert_eq!(read_cost(&json!(" 0.01 ")), Some(0.01));
        assert_eq!(read_cost(&json!("free")), None);
        assert_eq!(read_cost(&json!("NaN")), None);
        assert_eq!(read_cost(&json!({"usd": 1})), None);
    }

    #[test]
    fn string_lists_skip_foreign_elements() {
        assert_eq!(
            read_string_list(&json!(["a", 1, "b"])),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(read_string_list(&json!("solo")), Some(vec!["solo".to_string()]));
        assert_eq!(read_string_list(&json!(3)), None);
    }

    #[test]
    fn byte_sizes_round_floats_and_reject_negatives() {
        assert_eq!(read_byte_size(&json!(4096)), Some(4096));
        assert_eq!(read_byte_size(&json!(12.5)), Some(13));
        assert_eq!(read_byte_size(&json!("2048")), Some(2048));
        assert_eq!(read_byte_size(&json!(-1)), None);
        assert_eq!(read_byte_size(&json!([])), None);
    }
}
