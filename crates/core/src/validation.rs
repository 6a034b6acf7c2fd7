//! Payload validation against declarative entity schemas.
//!
//! A [`Schema`] lists the writable fields of an entity. [`Schema::validate`]
//! checks a raw JSON payload against it and either returns a normalized copy
//! (known fields only, values coerced to their canonical JSON type) or every
//! field error found. There is no partial success.

use chrono::Datelike;
use serde_json::{Map, Value};
use validator::ValidateLength;

use crate::error::FieldErrors;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_NULL: &str = "This field may not be null.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_UNKNOWN: &str = "Unknown field.";
pub const MSG_NOT_STRING: &str = "Not a valid string.";
pub const MSG_NOT_INTEGER: &str = "A valid integer is required.";

/// Storage type of a field as seen by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text, trimmed, non-blank, at most `max_len` characters.
    Text { max_len: u64 },
    /// Unbounded text, trimmed, non-blank.
    LongText,
    /// Whole number within `min..=max` (the bounds of the backing column).
    Integer { min: i64, max: i64 },
    /// Primary key of a related entity. Existence is checked by the store.
    Reference,
}

/// Extra constraint on a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Integer year must not be later than the current calendar year.
    NotAfterCurrentYear { message: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Output-only fields are accepted in payloads and ignored.
    pub read_only: bool,
    pub checks: &'static [Check],
}

impl FieldSpec {
    pub const fn text(name: &'static str, max_len: u64) -> Self {
        Self::new(name, FieldKind::Text { max_len })
    }

    pub const fn long_text(name: &'static str) -> Self {
        Self::new(name, FieldKind::LongText)
    }

    /// Integer stored in a 32-bit `INTEGER` column.
    pub const fn integer(name: &'static str) -> Self {
        Self::integer_in(name, i32::MIN as i64, i32::MAX as i64)
    }

    pub const fn integer_in(name: &'static str, min: i64, max: i64) -> Self {
        Self::new(name, FieldKind::Integer { min, max })
    }

    pub const fn reference(name: &'static str) -> Self {
        Self::new(name, FieldKind::Reference)
    }

    pub const fn read_only(name: &'static str) -> Self {
        Self {
            read_only: true,
            ..Self::new(name, FieldKind::LongText)
        }
    }

    pub const fn with_checks(self, checks: &'static [Check]) -> Self {
        Self { checks, ..self }
    }

    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            read_only: false,
            checks: &[],
        }
    }
}

/// Which fields a write must supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// New entity: every writable field is required.
    Create,
    /// Full update: every writable field is required.
    Replace,
    /// Partial update: only supplied fields are validated.
    Partial,
}

/// Facts about "now" that rules depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    pub current_year: i32,
}

impl ValidationContext {
    pub fn now() -> Self {
        Self {
            current_year: chrono::Utc::now().year(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Validate `payload` and return the normalized record.
    pub fn validate(
        &self,
        payload: &Map<String, Value>,
        mode: WriteMode,
        ctx: &ValidationContext,
    ) -> Result<Map<String, Value>, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut record = Map::new();

        for key in payload.keys() {
            if !self.fields.iter().any(|f| f.name == key) {
                errors.add(key.as_str(), MSG_UNKNOWN);
            }
        }

        for spec in self.fields.iter().filter(|f| !f.read_only) {
            match payload.get(spec.name) {
                None if mode == WriteMode::Partial => {}
                None => errors.add(spec.name, MSG_REQUIRED),
                Some(raw) => match clean(spec, raw, ctx) {
                    Ok(value) => {
                        record.insert(spec.name.to_string(), value);
                    }
                    Err(message) => errors.add(spec.name, message),
                },
            }
        }

        errors.into_result(record)
    }
}

fn clean(spec: &FieldSpec, raw: &Value, ctx: &ValidationContext) -> Result<Value, String> {
    if raw.is_null() {
        return Err(MSG_NULL.into());
    }

    let value = match spec.kind {
        FieldKind::Text { max_len } => {
            let text = text_value(raw)?;
            if !text.validate_length(None, Some(max_len), None) {
                return Err(format!(
                    "Ensure this field has no more than {max_len} characters."
                ));
            }
            Value::String(text)
        }
        FieldKind::LongText => Value::String(text_value(raw)?),
        FieldKind::Integer { min, max } => {
            let n = integer_value(raw).ok_or(MSG_NOT_INTEGER)?;
            if n < min {
                return Err(format!("Ensure this value is greater than or equal to {min}."));
            }
            if n > max {
                return Err(format!("Ensure this value is less than or equal to {max}."));
            }
            Value::from(n)
        }
        FieldKind::Reference => {
            let id = integer_value(raw).ok_or_else(|| {
                format!(
                    "Incorrect type. Expected pk value, received {}.",
                    json_type_name(raw)
                )
            })?;
            Value::from(id)
        }
    };

    for check in spec.checks {
        apply_check(*check, &value, ctx)?;
    }
    Ok(value)
}

fn apply_check(check: Check, value: &Value, ctx: &ValidationContext) -> Result<(), String> {
    match check {
        Check::NotAfterCurrentYear { message } => match value.as_i64() {
            Some(year) if year > i64::from(ctx.current_year) => Err(message.into()),
            _ => Ok(()),
        },
    }
}

/// Strings are trimmed; numbers are accepted in their textual form.
fn text_value(raw: &Value) -> Result<String, String> {
    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(MSG_NOT_STRING.into()),
    };
    if text.is_empty() {
        return Err(MSG_BLANK.into());
    }
    Ok(text)
}

/// Integers, integral floats and numeric strings.
fn integer_value(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_type_name(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const FUTURE: &str = "Publication year cannot be in the future.";

    const BOOK: Schema = Schema {
        entity: "Book",
        fields: &[
            FieldSpec::text("title", 20),
            FieldSpec::integer("publication_year")
                .with_checks(&[Check::NotAfterCurrentYear { message: FUTURE }]),
            FieldSpec::reference("author"),
            FieldSpec::read_only("books"),
        ],
    };

    const CTX: ValidationContext = ValidationContext { current_year: 2025 };

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn normalizes_a_valid_payload() {
        let record = BOOK
            .validate(
                &payload(json!({"title": "  Dune ", "publication_year": "1965", "author": 3})),
                WriteMode::Create,
                &CTX,
            )
            .unwrap();
        assert_eq!(
            Value::Object(record),
            json!({"title": "Dune", "publication_year": 1965, "author": 3})
        );
    }

    #[test]
    fn year_after_current_year_is_rejected() {
        let errors = BOOK
            .validate(
                &payload(json!({"title": "Later", "publication_year": 2026, "author": 1})),
                WriteMode::Create,
                &CTX,
            )
            .unwrap_err();
        assert_eq!(errors.messages("publication_year"), [FUTURE]);

        // The current year itself is fine.
        assert!(BOOK
            .validate(
                &payload(json!({"title": "Now", "publication_year": 2025, "author": 1})),
                WriteMode::Create,
                &CTX,
            )
            .is_ok());
    }

    #[test]
    fn errors_are_aggregated_across_fields() {
        let errors = BOOK
            .validate(
                &payload(json!({
                    "title": "a title that is far too long for the limit",
                    "publication_year": "soon",
                    "isbn": "123",
                })),
                WriteMode::Create,
                &CTX,
            )
            .unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["author", "isbn", "publication_year", "title"]
        );
        assert_eq!(errors.messages("author"), [MSG_REQUIRED]);
        assert_eq!(errors.messages("isbn"), [MSG_UNKNOWN]);
        assert_eq!(errors.messages("publication_year"), [MSG_NOT_INTEGER]);
        assert_eq!(
            errors.messages("title"),
            ["Ensure this field has no more than 20 characters."]
        );
    }

    #[test]
    fn replace_requires_everything_partial_does_not() {
        let only_year = payload(json!({"publication_year": 2001}));

        let errors = BOOK
            .validate(&only_year, WriteMode::Replace, &CTX)
            .unwrap_err();
        assert!(errors.contains("title"));
        assert!(errors.contains("author"));

        let record = BOOK.validate(&only_year, WriteMode::Partial, &CTX).unwrap();
        assert_eq!(Value::Object(record), json!({"publication_year": 2001}));
    }

    #[test]
    fn integers_outside_the_column_range_are_rejected() {
        let errors = BOOK
            .validate(
                &payload(json!({"publication_year": -3_000_000_000_i64})),
                WriteMode::Partial,
                &CTX,
            )
            .unwrap_err();
        assert_eq!(
            errors.messages("publication_year"),
            ["Ensure this value is greater than or equal to -2147483648."]
        );

        const SMALL: Schema = Schema {
            entity: "Shelf",
            fields: &[FieldSpec::integer_in("slots", 0, 10)],
        };
        let errors = SMALL
            .validate(&payload(json!({"slots": "11"})), WriteMode::Create, &CTX)
            .unwrap_err();
        assert_eq!(
            errors.messages("slots"),
            ["Ensure this value is less than or equal to 10."]
        );
        assert!(SMALL
            .validate(&payload(json!({"slots": 0})), WriteMode::Create, &CTX)
            .is_ok());
    }

    #[test]
    fn read_only_fields_are_ignored() {
        let record = BOOK
            .validate(
                &payload(json!({"title": "T", "books": [1, 2]})),
                WriteMode::Partial,
                &CTX,
            )
            .unwrap();
        assert!(!record.contains_key("books"));
    }

    #[test]
    fn null_blank_and_wrong_types() {
        let errors = BOOK
            .validate(
                &payload(json!({"title": "   ", "publication_year": null, "author": true})),
                WriteMode::Partial,
                &CTX,
            )
            .unwrap_err();
        assert_eq!(errors.messages("title"), [MSG_BLANK]);
        assert_eq!(errors.messages("publication_year"), [MSG_NULL]);
        assert_eq!(
            errors.messages("author"),
            ["Incorrect type. Expected pk value, received bool."]
        );

        let errors = BOOK
            .validate(&payload(json!({"title": ["x"]})), WriteMode::Partial, &CTX)
            .unwrap_err();
        assert_eq!(errors.messages("title"), [MSG_NOT_STRING]);
    }
}
