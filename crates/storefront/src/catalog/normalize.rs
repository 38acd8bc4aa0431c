//! Typed field extraction from loosely-shaped documents.
//!
//! Product documents were written by several generations of admin tooling:
//! the same field may appear as `productType` or `product_type`, and a value
//! may be a bare JSON scalar or a Firestore envelope such as
//! `{"integerValue": "12"}`. Everything here is total; unrecognized shapes
//! yield `None` and callers apply their own default.

use serde_json::Value;

use crate::store::Fields;

/// A decoded scalar, before conversion to the caller's kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Text(&'a str),
    Integer(i64),
    Double(f64),
    Bool(bool),
}

impl<'a> Scalar<'a> {
    /// Decode a bare or wrapped scalar value.
    #[must_use]
    pub fn decode(value: &'a Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s)),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Double)),
            Value::Object(map) => {
                if let Some(s) = map.get("stringValue").and_then(Value::as_str) {
                    Some(Self::Text(s))
                } else if let Some(v) = map.get("integerValue") {
                    // int64 arrives as a JSON string
                    match v {
                        Value::String(s) => s.trim().parse().ok().map(Self::Integer),
                        Value::Number(n) => n.as_i64().map(Self::Integer),
                        _ => None,
                    }
                } else if let Some(v) = map.get("doubleValue") {
                    match v {
                        Value::Number(n) => n.as_f64().map(Self::Double),
                        Value::String(s) => s.trim().parse().ok().map(Self::Double),
                        _ => None,
                    }
                } else {
                    map.get("booleanValue")
                        .and_then(Value::as_bool)
                        .map(Self::Bool)
                }
            }
            Value::Null | Value::Array(_) => None,
        }
    }
}

/// A scalar kind that fields can be extracted as.
pub trait FieldKind: Sized {
    /// Convert a decoded scalar, or `None` when it does not fit this kind.
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self>;
}

impl FieldKind for String {
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
        Some(match scalar {
            Scalar::Text(s) => s.to_owned(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Double(d) => d.to_string(),
            Scalar::Bool(b) => b.to_string(),
        })
    }
}

impl FieldKind for i64 {
    #[allow(clippy::cast_possible_truncation)] // Saturating float-to-int cast is the intent
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
        match scalar {
            Scalar::Integer(i) => Some(i),
            Scalar::Double(d) if d.is_finite() => Some(d.trunc() as Self),
            Scalar::Text(s) => {
                let s = s.trim();
                s.parse().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|d| d.is_finite())
                        .map(|d| d.trunc() as Self)
                })
            }
            Scalar::Double(_) | Scalar::Bool(_) => None,
        }
    }
}

impl FieldKind for f64 {
    #[allow(clippy::cast_precision_loss)] // Catalog numbers are far below 2^52
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
        match scalar {
            Scalar::Integer(i) => Some(i as Self),
            Scalar::Double(d) => Some(d),
            Scalar::Text(s) => s.trim().parse().ok().filter(|d: &Self| d.is_finite()),
            Scalar::Bool(_) => None,
        }
    }
}

impl FieldKind for bool {
    fn from_scalar(scalar: Scalar<'_>) -> Option<Self> {
        match scalar {
            Scalar::Bool(b) => Some(b),
            Scalar::Text(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
            Scalar::Text(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }
}

/// Extract a field as kind `T`.
///
/// Tries the exact name, then its camelCase form, then its snake_case form.
/// A present but undecodable value moves on to the next spelling.
#[must_use]
pub fn extract_field<T: FieldKind>(fields: &Fields, name: &str) -> Option<T> {
    name_variants(name)
        .iter()
        .filter_map(|key| fields.get(key))
        .find_map(|value| Scalar::decode(value).and_then(T::from_scalar))
}

/// Extract a text field, treating blank strings as absent.
#[must_use]
pub fn extract_text(fields: &Fields, name: &str) -> Option<String> {
    name_variants(name)
        .iter()
        .filter_map(|key| fields.get(key))
        .filter_map(|value| Scalar::decode(value).and_then(String::from_scalar))
        .map(|s| s.trim().to_owned())
        .find(|s| !s.is_empty())
}

/// Find the raw value of a field under any of its spellings.
#[must_use]
pub fn raw_field<'a>(fields: &'a Fields, name: &str) -> Option<&'a Value> {
    name_variants(name).iter().find_map(|key| fields.get(key))
}

/// Read a list of strings.
///
/// Accepts a bare array, a wrapped `arrayValue`, or one comma-separated
/// string. Entries are trimmed and empties dropped.
#[must_use]
pub fn extract_string_list(fields: &Fields, name: &str) -> Vec<String> {
    let Some(value) = raw_field(fields, name) else {
        return Vec::new();
    };

    if let Some(items) = as_array(value) {
        return items
            .iter()
            .filter_map(|v| Scalar::decode(v).and_then(String::from_scalar))
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }

    match Scalar::decode(value) {
        Some(Scalar::Text(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

/// Elements of a bare array or a wrapped `arrayValue`.
#[must_use]
pub fn as_array(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("arrayValue").map(|array| {
            array
                .get("values")
                .and_then(Value::as_array)
                .map_or(&[][..], Vec::as_slice)
        }),
        _ => None,
    }
}

/// Fields of a bare object or a wrapped `mapValue`.
#[must_use]
pub fn as_map(value: &Value) -> Option<&Fields> {
    let map = value.as_object()?;
    match map.get("mapValue") {
        Some(wrapped) => wrapped.get("fields").and_then(Value::as_object),
        None => Some(map),
    }
}

/// The exact name followed by its camelCase and snake_case spellings,
/// without duplicates.
fn name_variants(name: &str) -> Vec<String> {
    let mut variants = vec![name.to_owned()];
    for candidate in [to_camel_case(name), to_snake_case(name)] {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
