//! Field registry entries and typed field values.

use crate::diff::files::filename_from_reference;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// How a monitored field's value is interpreted for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Number,
    Boolean,
    Date,
    Array,
    Object,
    File,
}

/// Registry entry for one monitored field
///
/// Fields without an entry are never compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub field: String,
    pub label: String,
    #[serde(alias = "kind")]
    pub value_kind: ValueKind,
}

impl FieldMapping {
    pub fn new(field: impl Into<String>, label: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            value_kind,
        }
    }
}

/// A raw field value tagged by its shape
///
/// Built from the raw JSON value and the mapping's kind without coercion: the
/// kind only refines strings (into `Date` or `File`). A value whose shape does
/// not fit the kind keeps the variant of its actual shape, so a `"12"` under a
/// number mapping is `Text("12")`. `to_value` returns the raw value unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Absent,
    Null,
    Text(String),
    Number(Number),
    Boolean(bool),
    Date(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
    File(String),
}

impl FieldValue {
    /// Classify a raw value (`None` = field absent) under a mapping kind
    pub fn from_raw(kind: ValueKind, raw: Option<&Value>) -> Self {
        match raw {
            None => FieldValue::Absent,
            Some(Value::Null) => FieldValue::Null,
            Some(Value::Bool(b)) => FieldValue::Boolean(*b),
            Some(Value::Number(n)) => FieldValue::Number(n.clone()),
            Some(Value::Array(items)) => FieldValue::Array(items.clone()),
            Some(Value::Object(map)) => FieldValue::Object(map.clone()),
            Some(Value::String(s)) => match kind {
                ValueKind::Date => FieldValue::Date(s.clone()),
                ValueKind::File => FieldValue::File(s.clone()),
                _ => FieldValue::Text(s.clone()),
            },
        }
    }

    /// The raw value; `None` for `Absent`
    pub fn to_value(&self) -> Option<Value> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Null => Some(Value::Null),
            FieldValue::Text(s) | FieldValue::Date(s) | FieldValue::File(s) => {
                Some(Value::String(s.clone()))
            }
            FieldValue::Number(n) => Some(Value::Number(n.clone())),
            FieldValue::Boolean(b) => Some(Value::Bool(*b)),
            FieldValue::Array(items) => Some(Value::Array(items.clone())),
            FieldValue::Object(map) => Some(Value::Object(map.clone())),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Absent | FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Array(items) => items.is_empty(),
            FieldValue::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Human-readable rendering used in audit entries and summaries
    ///
    /// `kind` matters for arrays (file lists render as file names) and for
    /// numbers under a date mapping (read as epoch milliseconds).
    pub fn display(&self, kind: ValueKind) -> String {
        if self.is_empty() {
            return EMPTY_DISPLAY.to_string();
        }
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Boolean(true) => "Yes".to_string(),
            FieldValue::Boolean(false) => "No".to_string(),
            FieldValue::Number(n) if kind == ValueKind::Date => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| display_number(n)),
            FieldValue::Number(n) => display_number(n),
            FieldValue::Date(s) => display_date(s),
            FieldValue::File(s) => filename_from_reference(s),
            FieldValue::Array(items) => items
                .iter()
                .map(|item| match (item, kind) {
                    (Value::String(s), ValueKind::File) => filename_from_reference(s),
                    (Value::String(s), _) => s.clone(),
                    (other, _) => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Object(map) => Value::Object(map.clone()).to_string(),
            FieldValue::Absent | FieldValue::Null => EMPTY_DISPLAY.to_string(),
        }
    }
}

pub const EMPTY_DISPLAY: &str = "(empty)";

fn display_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

fn display_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_does_not_coerce() {
        let raw = json!("12");
        assert_eq!(
            FieldValue::from_raw(ValueKind::Number, Some(&raw)),
            FieldValue::Text("12".to_string())
        );
        assert_eq!(
            FieldValue::from_raw(ValueKind::Date, Some(&json!("2025-03-01"))),
            FieldValue::Date("2025-03-01".to_string())
        );
        assert_eq!(FieldValue::from_raw(ValueKind::Text, None), FieldValue::Absent);
    }

    #[test]
    fn test_to_value_round_trips_raw() {
        for raw in [json!("x"), json!(3.5), json!([1, "a"]), json!({"k": true}), json!(null)] {
            for kind in [ValueKind::Text, ValueKind::Date, ValueKind::File] {
                let v = FieldValue::from_raw(kind, Some(&raw));
                assert_eq!(v.to_value(), Some(raw.clone()));
            }
        }
        assert_eq!(FieldValue::Absent.to_value(), None);
    }

    #[test]
    fn test_display_by_kind() {
        assert_eq!(FieldValue::Boolean(true).display(ValueKind::Boolean), "Yes");
        assert_eq!(FieldValue::Null.display(ValueKind::Text), EMPTY_DISPLAY);
        assert_eq!(
            FieldValue::from_raw(ValueKind::Number, Some(&json!(70.0))).display(ValueKind::Number),
            "70"
        );
        assert_eq!(
            FieldValue::from_raw(ValueKind::Array, Some(&json!(["AV", "Catering"])))
                .display(ValueKind::Array),
            "AV, Catering"
        );
        assert_eq!(
            FieldValue::from_raw(ValueKind::File, Some(&json!(["https://cdn.example/o/17_plan%20v2.pdf"])))
                .display(ValueKind::File),
            "plan v2.pdf"
        );
        assert_eq!(
            FieldValue::Date("2025-03-01T18:30:00Z".to_string()).display(ValueKind::Date),
            "2025-03-01 18:30 UTC"
        );
    }

    #[test]
    fn test_mapping_accepts_kind_alias() {
        let mapping: FieldMapping =
            serde_json::from_value(json!({"field": "name", "label": "Event name", "kind": "text"}))
                .unwrap();
        assert_eq!(mapping.value_kind, ValueKind::Text);
    }
}
