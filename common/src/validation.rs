//! Field-level validation shared by the backend (storage boundary) and the
//! frontend (form feedback).
//!
//! Rules are declared on the models with `validator` derives; this module turns
//! the resulting `ValidationErrors` into a flat, serializable list the UI can
//! attach to individual form fields.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// A single failed rule, addressed by the camelCase field name the form uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Runs the derived rules of `value` and maps any failure to `Error::Validation`.
pub fn check<T: Validate>(value: &T) -> Result<()> {
    value
        .validate()
        .map_err(|errors| Error::Validation(field_errors(&errors)))
}

/// Flattens `validator` output, sorted by field so responses are stable.
///
/// Nested structs are addressed with dotted paths (`outerBorder.width`) and list
/// entries with their index (`questions[2].options`).
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = format!("{prefix}{}", to_camel_case(field));
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| FieldError::new(path.clone(), describe(e))));
            }
            ValidationErrorsKind::Struct(inner) => {
                collect(inner, &format!("{path}."), out);
            }
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    collect(inner, &format!("{path}[{index}]."), out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let param = |name: &str| error.params.get(name).map(|v| v.to_string());
    match &*error.code {
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("must be between {min} and {max} characters"),
            (Some(min), None) => format!("must be at least {min} characters"),
            (None, Some(max)) => format!("must be at most {max} characters"),
            (None, None) => "has an invalid length".to_string(),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("must be between {min} and {max}"),
            (Some(min), None) => format!("must be at least {min}"),
            (None, Some(max)) => format!("must be at most {max}"),
            (None, None) => "is out of range".to_string(),
        },
        "email" => "must be a valid email address".to_string(),
        "required" => "is required".to_string(),
        other => format!("failed the `{other}` rule"),
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// `#rgb` or `#rrggbb`.
pub fn hex_color(value: &str) -> std::result::Result<(), ValidationError> {
    let digits = value.strip_prefix('#').unwrap_or("");
    let valid_len = digits.len() == 3 || digits.len() == 6;
    if valid_len && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color");
        err.message = Some("must be a hex color such as #1a2b3c".into());
        Err(err)
    }
}

/// Digits, spaces and `+-()`, with at least seven digits.
pub fn phone_number(value: &str) -> std::result::Result<(), ValidationError> {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || " +-()".contains(c));
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if allowed && digits >= 7 {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("must be a phone number".into());
        Err(err)
    }
}

/// Rejects strings that are empty once trimmed.
pub fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("is required".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Longest id a client may choose.
pub const MAX_ID_LEN: usize = 64;

/// ASCII letters, digits, `-` and `_`. Ids end up in file names.
pub fn record_id(value: &str) -> std::result::Result<(), ValidationError> {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if allowed && !value.is_empty() && value.len() <= MAX_ID_LEN {
        Ok(())
    } else {
        let mut err = ValidationError::new("id");
        err.message =
            Some(format!("must be 1 to {MAX_ID_LEN} letters, digits, `-` or `_`").into());
        Err(err)
    }
}

/// Thinnest visible border, in logical canvas units.
pub const MIN_BORDER_WIDTH: f64 = 0.25;

/// Zero hides a border; anything else must be thick enough to draw.
pub fn border_width(value: f64) -> std::result::Result<(), ValidationError> {
    if value == 0.0 || (MIN_BORDER_WIDTH..=50.0).contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("border_width");
        err.message = Some(format!("must be 0 or between {MIN_BORDER_WIDTH} and 50").into());
        Err(err)
    }
}

/// Field error for a client-supplied id that [`record_id`] rejects.
pub fn check_id(id: &str) -> Result<()> {
    record_id(id).map_err(|err| Error::Validation(vec![FieldError::new("id", describe(&err))]))
}
