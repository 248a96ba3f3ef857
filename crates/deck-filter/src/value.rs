//! Filter values and loose comparison against record fields
//!
//! Records are schemaless JSON, so a filter value has to compare sensibly
//! against whatever primitive sits in the field: a status filter set to
//! `"3"` must match a numeric `3`, and a boolean flag compares as `0`/`1`.
//! [`loose_eq`] implements that coercion table.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Comparison value carried by a filter
///
/// The empty text value means "unset": a filter holding it is inactive no
/// matter which condition it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean flag
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Text value; empty text is the unset marker
    Text(String),
}

impl FilterValue {
    /// The unset marker (empty text)
    #[inline]
    #[must_use]
    pub fn unset() -> Self {
        Self::Text(String::new())
    }

    /// Check whether this value marks the filter as inactive
    #[inline]
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// Build a filter value from a JSON field
    ///
    /// Primitives map directly; `null` becomes the unset marker and
    /// arrays/objects use their text rendering.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => number
                .as_f64()
                .map_or_else(|| Self::Text(number.to_string()), Self::Number),
            Value::String(text) => Self::Text(text.clone()),
            Value::Null => Self::unset(),
            other => Self::Text(field_text(other)),
        }
    }

    fn as_primitive(&self) -> Primitive<'_> {
        match self {
            Self::Bool(flag) => Primitive::Bool(*flag),
            Self::Number(number) => Primitive::Number(*number),
            Self::Text(text) => Primitive::Text(Cow::Borrowed(text)),
        }
    }
}

impl Default for FilterValue {
    fn default() -> Self {
        Self::unset()
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Number(number) => f.write_str(&format_number(*number)),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FilterValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Primitive view of a field or filter value after object-to-primitive
/// conversion
#[derive(Debug, Clone)]
enum Primitive<'a> {
    Bool(bool),
    Number(f64),
    Text(Cow<'a, str>),
}

impl<'a> Primitive<'a> {
    /// `None` for `null`, which is never loosely equal to a filter value
    fn from_json(value: &'a Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(flag) => Some(Self::Bool(*flag)),
            Value::Number(number) => Some(number.as_f64().map_or_else(
                || Self::Text(Cow::Owned(number.to_string())),
                Self::Number,
            )),
            Value::String(text) => Some(Self::Text(Cow::Borrowed(text))),
            other => Some(Self::Text(Cow::Owned(field_text(other)))),
        }
    }
}

/// Loose equality between a record field and a filter value
///
/// A missing or `null` field never equals anything. Otherwise:
/// - same kinds compare directly (`NaN` never equals itself)
/// - booleans become `1`/`0` before comparing with other kinds
/// - text against a number compares numerically, where the text is trimmed and
///   empty text counts as `0`
/// - arrays and objects compare through their text rendering
#[must_use]
pub fn loose_eq(field: Option<&Value>, value: &FilterValue) -> bool {
    let Some(field) = field.and_then(Primitive::from_json) else {
        return false;
    };
    primitive_eq(field, value.as_primitive())
}

fn primitive_eq(left: Primitive<'_>, right: Primitive<'_>) -> bool {
    match (left, right) {
        (Primitive::Number(a), Primitive::Number(b)) => a == b,
        (Primitive::Text(a), Primitive::Text(b)) => a == b,
        (Primitive::Bool(a), Primitive::Bool(b)) => a == b,
        (Primitive::Bool(a), other) => primitive_eq(Primitive::Number(bool_number(a)), other),
        (other, Primitive::Bool(b)) => primitive_eq(other, Primitive::Number(bool_number(b))),
        (Primitive::Number(n), Primitive::Text(t)) | (Primitive::Text(t), Primitive::Number(n)) => {
            text_to_number(&t).is_some_and(|parsed| parsed == n)
        }
    }
}

#[inline]
fn bool_number(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Numeric reading of a text value; `None` stands for `NaN`
///
/// Accepts surrounding whitespace, decimal and exponent forms, signed
/// `Infinity`, and unsigned `0x`/`0o`/`0b` prefixes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn text_to_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            // from_str_radix takes a leading '+', which prefixed literals do not
            if digits.starts_with(['+', '-']) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    // Rust's float parser also takes "inf"/"nan" spellings that must stay NaN here
    let plain = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !plain {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Text rendering of a JSON value, as used for display-list keys and for
/// comparing arrays/objects against primitives
#[must_use]
pub fn field_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number
            .as_f64()
            .map_or_else(|| number.to_string(), format_number),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => field_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn format_number(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        let text = if number > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if number == number.trunc() && number.abs() < 1e21 {
        // integral values print without a fractional part
        format!("{number:.0}")
    } else {
        number.to_string()
    }
}
