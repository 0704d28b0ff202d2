//! # Specification Extensions
//!
//! `x-` prefixed members allowed on most objects. They are collected through
//! `#[serde(flatten)]`, which also makes this type the gate for strict decoding:
//! any member that is neither a known field nor an `x-` extension ends up here
//! and is rejected.

use crate::errpath::PathError;
use serde::de::{Error as DeError, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Terminal message for members that are neither known nor extensions.
pub const ERR_UNKNOWN_FIELD: &str = "unknown field or extension without \"x-\" prefix";

const PREFIX: &str = "x-";

/// Ordered bag of extension members.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Extensions(Map<String, Value>);

impl Extensions {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether there are no extensions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of extensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Looks up an extension by its full name (including `x-`).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Adds an extension. The key is checked by `validate`, not here.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Iterates in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Orders extensions by key.
    pub fn sort(&mut self) {
        let mut entries: Vec<(String, Value)> = std::mem::take(&mut self.0).into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        self.0 = entries.into_iter().collect();
    }

    /// Rejects keys inserted programmatically without the `x-` prefix.
    pub fn validate(&self) -> Result<(), PathError> {
        match self.0.keys().find(|k| !k.starts_with(PREFIX)) {
            Some(key) => Err(PathError::message(ERR_UNKNOWN_FIELD).field(key.as_str())),
            None => Ok(()),
        }
    }
}

struct ExtensionsVisitor;

impl<'de> Visitor<'de> for ExtensionsVisitor {
    type Value = Extensions;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("specification extensions")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Extensions, A::Error> {
        let mut map = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            if !key.starts_with(PREFIX) {
                return Err(A::Error::custom(format!("{key}: {ERR_UNKNOWN_FIELD}")));
            }
            let value = access.next_value::<Value>()?;
            map.insert(key, value);
        }
        Ok(Extensions(map))
    }
}

impl<'de> Deserialize<'de> for Extensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ExtensionsVisitor)
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)` so it survives a round trip.
/// Use with `#[serde(default, deserialize_with = "...")]`.
pub(crate) fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

/// Short name of a dynamic value's kind, as used in type mismatch messages.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize)]
    struct Host {
        name: String,
        #[serde(flatten)]
        extensions: Extensions,
    }

    #[test]
    fn test_flattened_extensions_keep_order() {
        let host: Host =
            serde_json::from_str(r#"{"name": "a", "x-zeta": 1, "x-alpha": {"b": true}}"#).unwrap();
        assert_eq!(host.extensions.len(), 2);
        assert_eq!(
            serde_json::to_string(&host).unwrap(),
            r#"{"name":"a","x-zeta":1,"x-alpha":{"b":true}}"#
        );
    }

    #[test]
    fn test_unknown_member_rejected_at_decode() {
        let err = serde_json::from_str::<Host>(r#"{"name": "a", "foo": 1}"#).unwrap_err();
        assert!(err.to_string().contains(ERR_UNKNOWN_FIELD), "{err}");
    }

    #[test]
    fn test_validate_programmatic_keys() {
        let mut ext = Extensions::new();
        ext.insert("x-ok", json!(1));
        assert!(ext.validate().is_ok());
        ext.insert("foo", json!("bar"));
        assert_eq!(
            ext.validate().unwrap_err().to_string(),
            r#"foo: unknown field or extension without "x-" prefix"#
        );
    }

    #[test]
    fn test_present_and_kind_name() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "present")]
            example: Option<Value>,
        }
        let h: Holder = serde_json::from_str(r#"{"example": null}"#).unwrap();
        assert_eq!(h.example, Some(Value::Null));
        let h: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(h.example, None);

        assert_eq!(kind_name(&json!(3.5)), "float");
        assert_eq!(kind_name(&json!(3)), "integer");
        assert_eq!(kind_name(&json!([1])), "array");
    }
}
