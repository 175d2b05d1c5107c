//! Typed field values and coercion from the generic (`serde_json::Value`) form.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockroom_core::{DomainError, DomainResult};

use crate::field::FieldType;

/// Lowest and highest valid danger category.
pub const CATEGORY_RANGE: core::ops::RangeInclusive<i64> = 1..=4;

/// A field value after coercion to its declared [`FieldType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Category(u8),
    FloatList(Vec<f64>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Back to the generic representation.
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Null => JsonValue::Null,
            FieldValue::Text(s) => JsonValue::from(s.as_str()),
            FieldValue::Integer(n) => JsonValue::from(*n),
            FieldValue::Float(f) => JsonValue::from(*f),
            FieldValue::Category(c) => JsonValue::from(*c),
            FieldValue::FloatList(items) => JsonValue::from(items.clone()),
        }
    }
}

impl core::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Category(c) => write!(f, "{c}"),
            FieldValue::FloatList(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

/// Clamp a raw category into the valid range, or unset it.
pub fn normalize_category(raw: i64) -> Option<u8> {
    if CATEGORY_RANGE.contains(&raw) {
        u8::try_from(raw).ok()
    } else {
        None
    }
}

/// Coerce a single generic value to `field_type`.
///
/// A JSON array is accepted only for list fields, where it is converted
/// element by element via [`coerce_list`].
pub fn coerce(field_type: FieldType, value: &JsonValue) -> DomainResult<FieldValue> {
    if value.is_null() {
        return if field_type.is_optional() {
            Ok(FieldValue::Null)
        } else {
            Err(mismatch(field_type, value))
        };
    }

    match field_type {
        FieldType::Text | FieldType::OptionalText => to_text(value)
            .map(FieldValue::Text)
            .ok_or_else(|| mismatch(field_type, value)),
        FieldType::Integer => to_integer(value)
            .map(FieldValue::Integer)
            .ok_or_else(|| mismatch(field_type, value)),
        FieldType::OptionalFloat => to_float(value)
            .map(FieldValue::Float)
            .ok_or_else(|| mismatch(field_type, value)),
        FieldType::Category => {
            let raw = to_integer(value).ok_or_else(|| mismatch(field_type, value))?;
            Ok(normalize_category(raw).map_or(FieldValue::Null, FieldValue::Category))
        }
        FieldType::FloatList => match value {
            JsonValue::Array(items) => coerce_list(field_type, items),
            other => Err(mismatch(field_type, other)),
        },
    }
}

/// Coerce an array payload; fails as a whole on the first bad element.
pub fn coerce_list(field_type: FieldType, values: &[JsonValue]) -> DomainResult<FieldValue> {
    if !field_type.is_list() {
        return Err(DomainError::conversion(format!(
            "cannot assign a list to a {field_type} field"
        )));
    }

    let items = values
        .iter()
        .enumerate()
        .map(|(idx, v)| {
            to_float(v).ok_or_else(|| {
                DomainError::conversion(format!("element {idx} ({v}) is not a float"))
            })
        })
        .collect::<DomainResult<Vec<f64>>>()?;
    Ok(FieldValue::FloatList(items))
}

/// Coerce to required text (the `name`/`id` positions of a constructor).
pub fn coerce_text(value: &JsonValue) -> DomainResult<String> {
    to_text(value).ok_or_else(|| mismatch(FieldType::Text, value))
}

/// Coerce to a required integer (the `amount` position of a constructor).
pub fn coerce_integer(value: &JsonValue) -> DomainResult<i64> {
    to_integer(value).ok_or_else(|| mismatch(FieldType::Integer, value))
}

fn mismatch(field_type: FieldType, value: &JsonValue) -> DomainError {
    DomainError::conversion(format!("{value} is not a valid {field_type}"))
}

fn to_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn to_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_float(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
