//! The property codec: conversion between the orchestrator's wire-level
//! property bags (JSON) and the typed [`PropertyMap`] used internally.
//!
//! Two markers need special care:
//!
//! - **Unknown values**: during plan/preview the orchestrator sends a
//!   sentinel string for values that are not yet known. These must round-trip
//!   untouched and must never be interpreted as concrete values.
//! - **Nulls**: with [`MarshalOptions::skip_nulls`], null-valued properties
//!   are dropped from mappings on both encode and decode, matching the
//!   marshal options the orchestrator uses for resource state.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ProviderError;

/// Sentinel string the orchestrator uses for values not yet known during
/// plan/preview. The exact value is fixed by the host protocol.
pub const UNKNOWN_VALUE: &str = "04da6b54-80e4-46f7-96ec-b56ff0331ba9";

/// A typed property bag. `BTreeMap` keeps iteration deterministic, which
/// keeps diffs and derived IDs deterministic too.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A single tagged property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A string value.
    String(String),
    /// A numeric value (JSON numbers are 64-bit floats on the wire).
    Number(f64),
    /// A boolean value.
    Bool(bool),
    /// An ordered sequence of values.
    Sequence(Vec<PropertyValue>),
    /// A nested mapping of named values.
    Mapping(PropertyMap),
    /// An explicit null.
    Null,
    /// A value not yet known (plan/preview only). Never a concrete value.
    Unknown,
}

impl PropertyValue {
    /// The type tag name used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Null => "null",
            Self::Unknown => "unknown",
        }
    }

    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the nested mapping, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&PropertyMap> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// True for the unknown-value marker.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Options controlling property marshalling, mirroring the marshal options
/// the orchestrator applies on its side of the wire.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarshalOptions {
    /// Pass unknown markers through untouched instead of failing on them.
    pub keep_unknowns: bool,
    /// Omit null-valued properties from mappings.
    pub skip_nulls: bool,
}

impl MarshalOptions {
    /// The options used for every resource state bag crossing the provider
    /// boundary: unknowns preserved, nulls skipped.
    pub const STATE: Self = Self {
        keep_unknowns: true,
        skip_nulls: true,
    };
}

/// Decode a wire-level property bag into a [`PropertyMap`].
///
/// The wire value must be a JSON object (or null, which decodes to an empty
/// bag). Unrecognized properties are preserved as-is; the codec never drops
/// fields it does not understand.
pub fn decode_properties(
    wire: &Value,
    opts: MarshalOptions,
) -> Result<PropertyMap, ProviderError> {
    match wire {
        Value::Null => Ok(PropertyMap::new()),
        Value::Object(obj) => decode_object(obj, opts),
        other => Err(ProviderError::Validation(format!(
            "expected property bag of type 'object' but got '{}'",
            json_type_name(other)
        ))),
    }
}

/// Encode a [`PropertyMap`] back into its wire-level JSON form.
pub fn encode_properties(props: &PropertyMap, opts: MarshalOptions) -> Value {
    let mut obj = serde_json::Map::new();
    for (name, value) in props {
        if opts.skip_nulls && matches!(value, PropertyValue::Null) {
            continue;
        }
        obj.insert(name.clone(), encode_value(value, opts));
    }
    Value::Object(obj)
}

fn decode_object(
    obj: &serde_json::Map<String, Value>,
    opts: MarshalOptions,
) -> Result<PropertyMap, ProviderError> {
    let mut props = PropertyMap::new();
    for (name, value) in obj {
        if opts.skip_nulls && value.is_null() {
            continue;
        }
        props.insert(name.clone(), decode_value(name, value, opts)?);
    }
    Ok(props)
}

fn decode_value(
    name: &str,
    value: &Value,
    opts: MarshalOptions,
) -> Result<PropertyValue, ProviderError> {
    match value {
        Value::Null => Ok(PropertyValue::Null),
        Value::Bool(b) => Ok(PropertyValue::Bool(*b)),
        Value::Number(n) => Ok(PropertyValue::Number(n.as_f64().unwrap_or(0.0))),
        Value::String(s) if s == UNKNOWN_VALUE => {
            if opts.keep_unknowns {
                Ok(PropertyValue::Unknown)
            } else {
                Err(ProviderError::Validation(format!(
                    "property '{}' is unknown and unknowns are not permitted here",
                    name
                )))
            }
        },
        Value::String(s) => Ok(PropertyValue::String(s.clone())),
        Value::Array(arr) => {
            let mut seq = Vec::with_capacity(arr.len());
            for item in arr {
                seq.push(decode_value(name, item, opts)?);
            }
            Ok(PropertyValue::Sequence(seq))
        },
        Value::Object(obj) => Ok(PropertyValue::Mapping(decode_object(obj, opts)?)),
    }
}

fn encode_value(value: &PropertyValue, opts: MarshalOptions) -> Value {
    match value {
        PropertyValue::String(s) => Value::String(s.clone()),
        PropertyValue::Number(n) => encode_number(*n),
        PropertyValue::Bool(b) => Value::Bool(*b),
        PropertyValue::Sequence(seq) => {
            Value::Array(seq.iter().map(|v| encode_value(v, opts)).collect())
        },
        PropertyValue::Mapping(map) => encode_properties(map, opts),
        PropertyValue::Null => Value::Null,
        PropertyValue::Unknown => Value::String(UNKNOWN_VALUE.to_string()),
    }
}

// Integral values re-encode as JSON integers so a decoded bag is
// byte-for-byte identical when echoed back; the orchestrator compares
// inputs textually when rendering diffs.
fn encode_number(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::Number(serde_json::Number::from(n as i64))
    } else {
        // Non-finite numbers cannot cross the wire as JSON.
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Fetch a required string property, failing when it is absent, mistyped,
/// or still unknown. Used by `Create`/`Update`, which only run once every
/// input has a concrete value.
pub fn expect_string<'a>(props: &'a PropertyMap, name: &str) -> Result<&'a str, ProviderError> {
    match props.get(name) {
        None | Some(PropertyValue::Null) => Err(ProviderError::Validation(format!(
            "missing required property '{}'",
            name
        ))),
        Some(PropertyValue::String(s)) => Ok(s),
        Some(PropertyValue::Unknown) => Err(ProviderError::Validation(format!(
            "property '{}' is still unknown; a concrete value is required",
            name
        ))),
        Some(other) => Err(ProviderError::Validation(format!(
            "expected input property '{}' of type 'string' but got '{}'",
            name,
            other.type_name()
        ))),
    }
}

/// Fetch an optional string property. Absent or null yields `None`;
/// a present value of the wrong type is an error.
pub fn opt_string<'a>(
    props: &'a PropertyMap,
    name: &str,
) -> Result<Option<&'a str>, ProviderError> {
    match props.get(name) {
        None | Some(PropertyValue::Null) => Ok(None),
        Some(PropertyValue::String(s)) => Ok(Some(s)),
        Some(PropertyValue::Unknown) => Err(ProviderError::Validation(format!(
            "property '{}' is still unknown; a concrete value is required",
            name
        ))),
        Some(other) => Err(ProviderError::Validation(format!(
            "expected input property '{}' of type 'string' but got '{}'",
            name,
            other.type_name()
        ))),
    }
}

/// Fetch an optional numeric property. Absent or null yields `None`;
/// a present value of the wrong type is an error.
pub fn opt_number(props: &PropertyMap, name: &str) -> Result<Option<f64>, ProviderError> {
    match props.get(name) {
        None | Some(PropertyValue::Null) => Ok(None),
        Some(PropertyValue::Number(n)) => Ok(Some(*n)),
        Some(PropertyValue::Unknown) => Err(ProviderError::Validation(format!(
            "property '{}' is still unknown; a concrete value is required",
            name
        ))),
        Some(other) => Err(ProviderError::Validation(format!(
            "expected input property '{}' of type 'number' but got '{}'",
            name,
            other.type_name()
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
