//! Field value resolution.
//!
//! Turns a caller-supplied raw value into the exact typed payload the
//! field mutation accepts, dispatching on the field's discovered data
//! type. Resolution is pure: it never issues a remote call, which keeps
//! it testable against fixture catalogues.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use super::{FieldDataType, FieldDefinition};
use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S%.3fZ"];

const DATE_EXPECTATION: &str = "a date in YYYY-MM-DD or YYYY-MM-DDThh:mm:ss(.sss)Z format";

/// A value resolved against a field definition, ready for the mutation
/// input. Consumed immediately by the remote caller; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Text(String),
    Number(f64),
    Date(String),
    SingleSelectOptionId(String),
    IterationId(String),
}

impl ResolvedValue {
    /// Render as the `ProjectV2FieldValue` input fragment.
    pub fn to_input(&self) -> Value {
        match self {
            Self::Text(s) => json!({ "text": s }),
            Self::Number(n) => json!({ "number": n }),
            Self::Date(d) => json!({ "date": d }),
            Self::SingleSelectOptionId(id) => json!({ "singleSelectOptionId": id }),
            Self::IterationId(id) => json!({ "iterationId": id }),
        }
    }
}

/// Resolve `raw` against `field`.
///
/// Option and iteration lookups go by human-readable name, never by raw
/// id, so callers stay decoupled from remote identifiers. Lookup misses
/// report every valid name so a tool-calling client can self-correct.
pub fn resolve_value(field: &FieldDefinition, raw: &Value) -> Result<ResolvedValue> {
    match field.data_type {
        FieldDataType::Text => resolve_text(field, raw),
        FieldDataType::Number => resolve_number(field, raw),
        FieldDataType::Date => resolve_date(field, raw),
        FieldDataType::SingleSelect => resolve_single_select(field, raw),
        FieldDataType::Iteration => resolve_iteration(field, raw),
        FieldDataType::Unsupported => Err(Error::UnsupportedFieldType {
            field: field.name.clone(),
        }),
    }
}

fn resolve_text(field: &FieldDefinition, raw: &Value) -> Result<ResolvedValue> {
    match scalar_text(raw) {
        // Empty string is a valid text value, not an error.
        Some(text) => Ok(ResolvedValue::Text(text)),
        None => Err(invalid(field, raw, "a text string")),
    }
}

fn resolve_number(field: &FieldDefinition, raw: &Value) -> Result<ResolvedValue> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        // "NaN" and "inf" parse as floats but are not legal field values.
        Some(n) if n.is_finite() => Ok(ResolvedValue::Number(n)),
        _ => Err(invalid(field, raw, "a number")),
    }
}

fn resolve_date(field: &FieldDefinition, raw: &Value) -> Result<ResolvedValue> {
    let text = match raw.as_str() {
        Some(s) => s,
        None => return Err(invalid(field, raw, DATE_EXPECTATION)),
    };

    if is_valid_date(text) {
        // The remote accepts the string form unchanged.
        Ok(ResolvedValue::Date(text.to_string()))
    } else {
        Err(invalid(field, raw, DATE_EXPECTATION))
    }
}

/// Strict format contract: exact calendar dates or Z-suffixed timestamps
/// only. Ambiguous formats fail closed.
///
/// Chrono accepts unpadded numerics, so the digit layout is checked first
/// and chrono only validates the calendar (rejecting 2026-02-30 and the
/// like).
fn is_valid_date(text: &str) -> bool {
    if is_plain_date_shape(text) {
        return NaiveDate::parse_from_str(text, DATE_FORMAT).is_ok();
    }
    is_timestamp_shape(text)
        && TIMESTAMP_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
}

/// YYYY-MM-DD with zero padding.
fn is_plain_date_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() })
}

/// YYYY-MM-DDThh:mm:ssZ or YYYY-MM-DDThh:mm:ss.sssZ with zero padding.
fn is_timestamp_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    (bytes.len() == 20 || bytes.len() == 24)
        && text.get(..10).is_some_and(is_plain_date_shape)
        && bytes[10] == b'T'
        && bytes[bytes.len() - 1] == b'Z'
}

fn resolve_single_select(field: &FieldDefinition, raw: &Value) -> Result<ResolvedValue> {
    let wanted = scalar_text(raw).unwrap_or_else(|| raw.to_string());

    match field.options.iter().find(|o| o.name == wanted) {
        Some(option) => Ok(ResolvedValue::SingleSelectOptionId(option.id.clone())),
        None => Err(Error::OptionNotFound {
            field: field.name.clone(),
            value: wanted,
            available: field.options.iter().map(|o| o.name.clone()).collect(),
        }),
    }
}

fn resolve_iteration(field: &FieldDefinition, raw: &Value) -> Result<ResolvedValue> {
    let wanted = scalar_text(raw).unwrap_or_else(|| raw.to_string());

    match field.iterations.iter().find(|i| i.title == wanted) {
        Some(iteration) => Ok(ResolvedValue::IterationId(iteration.id.clone())),
        None => Err(Error::OptionNotFound {
            field: field.name.clone(),
            value: wanted,
            available: field.iterations.iter().map(|i| i.title.clone()).collect(),
        }),
    }
}

/// String form of a scalar JSON value; `None` for arrays, objects and null.
fn scalar_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn invalid(field: &FieldDefinition, raw: &Value, expected: &str) -> Error {
    Error::ValueFormatInvalid {
        field: field.name.clone(),
        value: scalar_text(raw).unwrap_or_else(|| raw.to_string()),
        expected: expected.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Iteration, SelectOption};

    fn field(name: &str, data_type: FieldDataType) -> FieldDefinition {
        FieldDefinition {
            id: format!("FID_{name}"),
            name: name.to_string(),
            data_type,
            options: vec![],
            iterations: vec![],
        }
    }

    fn status_field() -> FieldDefinition {
        FieldDefinition {
            options: vec![
                SelectOption {
                    id: "opt-todo".to_string(),
                    name: "Todo".to_string(),
                },
                SelectOption {
                    id: "opt-done".to_string(),
                    name: "Done".to_string(),
                },
            ],
            ..field("Status", FieldDataType::SingleSelect)
        }
    }

    fn sprint_field() -> FieldDefinition {
        FieldDefinition {
            iterations: vec![
                Iteration {
                    id: "iter-1".to_string(),
                    title: "Sprint 1".to_string(),
                },
                Iteration {
                    id: "iter-2".to_string(),
                    title: "Sprint 2".to_string(),
                },
            ],
            ..field("Sprint", FieldDataType::Iteration)
        }
    }

    #[test]
    fn test_text_passes_through() {
        let f = field("Notes", FieldDataType::Text);
        let resolved = resolve_value(&f, &json!("hello")).unwrap();
        assert_eq!(resolved, ResolvedValue::Text("hello".to_string()));
        assert_eq!(resolved.to_input(), json!({ "text": "hello" }));
    }

    #[test]
    fn test_empty_text_is_valid() {
        let f = field("Notes", FieldDataType::Text);
        assert_eq!(
            resolve_value(&f, &json!("")).unwrap(),
            ResolvedValue::Text(String::new())
        );
    }

    #[test]
    fn test_text_rejects_structured_values() {
        let f = field("Notes", FieldDataType::Text);
        assert!(resolve_value(&f, &json!({ "a": 1 })).is_err());
        assert!(resolve_value(&f, &json!([1, 2])).is_err());
    }

    #[test]
    fn test_number_from_number_and_string() {
        let f = field("Points", FieldDataType::Number);
        assert_eq!(
            resolve_value(&f, &json!(3)).unwrap(),
            ResolvedValue::Number(3.0)
        );
        assert_eq!(
            resolve_value(&f, &json!("2.5")).unwrap(),
            ResolvedValue::Number(2.5)
        );
    }

    #[test]
    fn test_number_parse_failure_names_the_field() {
        let f = field("Points", FieldDataType::Number);
        let err = resolve_value(&f, &json!("abc")).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Points"));
        assert!(text.contains("a number"));
    }

    #[test]
    fn test_number_rejects_nan_and_infinity() {
        let f = field("Points", FieldDataType::Number);
        assert!(resolve_value(&f, &json!("NaN")).is_err());
        assert!(resolve_value(&f, &json!("inf")).is_err());
    }

    #[test]
    fn test_date_accepts_strict_formats() {
        let f = field("Due", FieldDataType::Date);
        for ok in [
            "2026-08-07",
            "2026-08-07T10:30:00Z",
            "2026-08-07T10:30:00.123Z",
        ] {
            let resolved = resolve_value(&f, &json!(ok)).unwrap();
            assert_eq!(resolved, ResolvedValue::Date(ok.to_string()));
        }
    }

    #[test]
    fn test_date_fails_closed_on_other_formats() {
        let f = field("Due", FieldDataType::Date);
        for bad in [
            "08/07/2026",
            "2026-8-7",
            "tomorrow",
            "2026-08-07T10:30:00+02:00",
            "2026-02-30",
        ] {
            let err = resolve_value(&f, &json!(bad)).unwrap_err();
            assert!(err.to_string().contains("YYYY-MM-DD"), "{bad}");
        }
    }

    #[test]
    fn test_single_select_resolves_by_name() {
        let f = status_field();
        assert_eq!(
            resolve_value(&f, &json!("Done")).unwrap(),
            ResolvedValue::SingleSelectOptionId("opt-done".to_string())
        );
    }

    #[test]
    fn test_single_select_never_accepts_raw_ids() {
        let f = status_field();
        assert!(resolve_value(&f, &json!("opt-done")).is_err());
    }

    #[test]
    fn test_single_select_miss_lists_exactly_the_option_names() {
        let f = status_field();
        let err = resolve_value(&f, &json!("Doing")).unwrap_err();
        match err {
            Error::OptionNotFound {
                field,
                value,
                available,
            } => {
                assert_eq!(field, "Status");
                assert_eq!(value, "Doing");
                assert_eq!(available, vec!["Todo".to_string(), "Done".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_iteration_resolves_by_title() {
        let f = sprint_field();
        assert_eq!(
            resolve_value(&f, &json!("Sprint 2")).unwrap(),
            ResolvedValue::IterationId("iter-2".to_string())
        );

        let err = resolve_value(&f, &json!("Sprint 9")).unwrap_err();
        assert!(err.to_string().contains("Sprint 1, Sprint 2"));
    }

    #[test]
    fn test_unsupported_type_is_a_hard_stop() {
        let f = field("Assignees", FieldDataType::Unsupported);
        let err = resolve_value(&f, &json!("anyone")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFieldType { .. }));
    }

    #[test]
    fn test_input_fragments() {
        assert_eq!(
            ResolvedValue::Number(5.0).to_input(),
            json!({ "number": 5.0 })
        );
        assert_eq!(
            ResolvedValue::SingleSelectOptionId("o1".to_string()).to_input(),
            json!({ "singleSelectOptionId": "o1" })
        );
        assert_eq!(
            ResolvedValue::IterationId("i1".to_string()).to_input(),
            json!({ "iterationId": "i1" })
        );
    }
}
