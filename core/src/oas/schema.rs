//! # Schema Object
//!
//! The OpenAPI subset of JSON Schema. Schemas are recursive through `allOf`,
//! `anyOf`, `oneOf`, `items`, `properties` and `additionalProperties`; every one of
//! those positions holds a [`SchemaRef`], so self-referencing schemas are
//! represented by references rather than by copies.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::enums::{DataType, Format};
use crate::oas::extensions::{present, Extensions};
use crate::oas::reference::RefOr;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{trim_opt, Validate};
use crate::ordmap::OrdMap;
use crate::resolver::walk::{Location, Visitor, Walk};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A schema or a reference to one.
pub type SchemaRef = RefOr<Schema>;

/// Named schemas, in declaration order.
pub type SchemaRefs = OrdMap<String, SchemaRef>;

/// `additionalProperties`: a boolean switch or a schema for extra members.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` or `false`.
    Allowed(bool),
    /// Schema every additional member must satisfy.
    Schema(SchemaRef),
}

/// A Schema Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Short title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// CommonMark description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Primitive type. May only be omitted when a composition keyword is present.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    /// Format modifier for `data_type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    /// Must satisfy every listed schema.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaRef>,
    /// Must satisfy at least one listed schema.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaRef>,
    /// Must satisfy exactly one listed schema.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaRef>,
    /// Inclusive lower bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    /// Inclusive upper bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    /// Minimum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// ECMA-262 regular expression strings must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Minimum array length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// Maximum array length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Whether array items must be distinct.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
    /// Schema of array items. Required for `array`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaRef>,
    /// Object members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SchemaRefs>,
    /// Members that must be present. Each must be declared in `properties`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Members not named in `properties`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    /// Relevant only in responses.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    /// Relevant only in requests.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub write_only: bool,
    /// Whether the schema is being phased out.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Media type of string contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,
    /// Encoding of string contents, e.g. `base64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    /// Default value. Its kind must match `data_type`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Free-form example.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Schema {
    /// A schema of the given primitive type.
    pub fn of_type(data_type: DataType) -> Self {
        Self {
            data_type: Some(data_type),
            ..Self::default()
        }
    }

    /// Whether no keyword is set (`{}`).
    pub fn is_empty(&self) -> bool {
        *self == Schema::default()
    }

    fn type_name(&self) -> &str {
        self.data_type.as_ref().map_or("", DataType::as_str)
    }

    fn is_type(&self, ty: &DataType) -> bool {
        self.data_type.as_ref() == Some(ty)
    }

    fn has_composition(&self) -> bool {
        !(self.all_of.is_empty() && self.any_of.is_empty() && self.one_of.is_empty())
    }

    fn only_for(&self, what: &str) -> String {
        format!("only valid for {what} type, got {}", self.type_name())
    }

    fn validate_format(&self) -> Result<(), PathError> {
        let Some(format) = &self.format else {
            return Ok(());
        };
        format.validate()?;

        let allowed: &[&str] = match format {
            Format::Int32 | Format::Int64 => &["integer"],
            Format::Float | Format::Double => &["number"],
            Format::Duration => &["integer", "string"],
            _ => &["string"],
        };
        if allowed.contains(&self.type_name()) {
            return Ok(());
        }
        Err(PathError::invalid_str(format.as_str()).with_message(self.only_for(&allowed.join(" or "))))
    }

    fn validate_numbers(&self) -> Result<(), PathError> {
        if self.is_type(&DataType::Integer) {
            for (field, bound) in [("minimum", &self.minimum), ("maximum", &self.maximum)] {
                if let Some(n) = bound.as_ref().filter(|n| !is_integral(n)) {
                    return Err(PathError::invalid_display(fmt_number(n))
                        .with_message("not an integer")
                        .field(field));
                }
            }
        }

        if self.is_type(&DataType::Number) || self.is_type(&DataType::Integer) {
            if let (Some(min), Some(max)) = (&self.minimum, &self.maximum) {
                if as_f64(min) > as_f64(max) {
                    let (min, max) = (fmt_number(min), fmt_number(max));
                    return Err(PathError::invalid_display(&min)
                        .with_message(format!("minimum is greater than maximum ({min} > {max})"))
                        .field("minimum"));
                }
            }
            return Ok(());
        }

        for (field, bound) in [("minimum", &self.minimum), ("maximum", &self.maximum)] {
            if let Some(n) = bound {
                return Err(PathError::invalid_display(fmt_number(n))
                    .with_message(self.only_for("number"))
                    .field(field));
            }
        }
        Ok(())
    }

    fn validate_strings(&self) -> Result<(), PathError> {
        if let Some(pattern) = &self.pattern {
            if Regex::new(pattern).is_err() {
                return Err(PathError::invalid_str(pattern)
                    .with_message("must be a valid regular expression")
                    .field("pattern"));
            }
        }

        if self.is_type(&DataType::String) {
            if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
                if min > max {
                    return Err(PathError::invalid_display(min)
                        .with_message(format!("minLength is greater than maxLength ({min} > {max})"))
                        .field("minLength"));
                }
            }
            return Ok(());
        }

        for (field, bound) in [("minLength", self.min_length), ("maxLength", self.max_length)] {
            if let Some(n) = bound {
                return Err(PathError::invalid_display(n)
                    .with_message(self.only_for("string"))
                    .field(field));
            }
        }
        Ok(())
    }

    fn validate_enum(&self) -> Result<(), PathError> {
        let (Some(values), Some(ty)) = (&self.enum_values, &self.data_type) else {
            return Ok(());
        };
        for (i, value) in values.iter().enumerate() {
            if !value.is_null() && !value_fits(value, ty) {
                return Err(invalid_value(value)
                    .with_message(format!("does not match schema type, got {ty}"))
                    .index(i)
                    .field("enum"));
            }
        }
        Ok(())
    }

    fn validate_array(&mut self) -> Result<(), PathError> {
        if !self.is_type(&DataType::Array) {
            if let Some(n) = self.min_items {
                return Err(PathError::invalid_display(n)
                    .with_message(self.only_for("array"))
                    .field("minItems"));
            }
            if let Some(n) = self.max_items {
                return Err(PathError::invalid_display(n)
                    .with_message(self.only_for("array"))
                    .field("maxItems"));
            }
            if self.items.is_some() {
                return Err(PathError::invalid()
                    .with_message(self.only_for("array"))
                    .field("items"));
            }
            return Ok(());
        }

        if let (Some(min), Some(max)) = (self.min_items, self.max_items) {
            if min > max {
                return Err(PathError::invalid_display(min)
                    .with_message(format!("minItems is greater than maxItems ({min} > {max})"))
                    .field("minItems"));
            }
        }

        let Some(items) = &mut self.items else {
            return Err(PathError::Required.field("items"));
        };
        let empty = items.with(Schema::is_empty).unwrap_or(false);
        if !empty {
            items.validate().at_field("items")?;
        }
        Ok(())
    }

    fn validate_object(&mut self) -> Result<(), PathError> {
        if !self.is_type(&DataType::Object) {
            if self.properties.is_some() {
                return Err(PathError::invalid()
                    .with_message(self.only_for("object"))
                    .field("properties"));
            }
            if self.additional_properties.is_some() {
                return Err(PathError::invalid()
                    .with_message(self.only_for("object"))
                    .field("additionalProperties"));
            }
            return Ok(());
        }

        self.properties.validate().at_field("properties")?;

        for (i, name) in self.required.iter().enumerate() {
            let declared = self
                .properties
                .as_ref()
                .is_some_and(|props| props.contains_key(name));
            if !declared {
                return Err(PathError::invalid_str(name)
                    .with_message("property does not exist")
                    .index(i)
                    .field("required"));
            }
        }

        if let Some(AdditionalProperties::Schema(schema)) = &mut self.additional_properties {
            schema.validate().at_field("additionalProperties")?;
        }
        Ok(())
    }

    fn validate_default(&mut self) -> Result<(), PathError> {
        let (Some(default), Some(ty)) = (&mut self.default, &self.data_type) else {
            return Ok(());
        };
        if default.is_null() {
            return Ok(());
        }
        if !value_fits(default, ty) {
            return Err(invalid_value(default)
                .with_message(format!("does not match schema type, got {ty}"))
                .field("default"));
        }
        if *ty == DataType::Integer {
            promote_integral(default);
        }
        if let Some(values) = &self.enum_values {
            if !values.iter().any(|v| same_value(v, default)) {
                let listed: Vec<String> = values.iter().map(Value::to_string).collect();
                return Err(invalid_value(default)
                    .with_message(format!("is not one of the enums ([{}])", listed.join(" ")))
                    .field("default"));
            }
        }
        Ok(())
    }
}

/// Rewrites an integral float such as `3.0` to the integer `3`.
fn promote_integral(value: &mut Value) {
    let Value::Number(n) = value else {
        return;
    };
    if !n.is_f64() {
        return;
    }
    let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0) else {
        return;
    };
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        *value = Value::from(f as i64);
    } else if f >= 0.0 && f < u64::MAX as f64 {
        *value = Value::from(f as u64);
    }
}

/// Equality where numbers compare by value, so `3` matches `3.0`.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => as_f64(x) == as_f64(y),
            },
        },
        _ => a == b,
    }
}

/// Whether a dynamic value has the native kind of `ty`. Integral floats count
/// as integers.
pub(crate) fn value_fits(value: &Value, ty: &DataType) -> bool {
    match (value, ty) {
        (Value::String(_), DataType::String)
        | (Value::Bool(_), DataType::Boolean)
        | (Value::Array(_), DataType::Array)
        | (Value::Object(_), DataType::Object)
        | (Value::Number(_), DataType::Number) => true,
        (Value::Number(n), DataType::Integer) => is_integral(n),
        _ => false,
    }
}

/// `Invalid` carrying a dynamic value, rendered like the typed constructors.
pub(crate) fn invalid_value(value: &Value) -> PathError {
    match value {
        Value::String(s) => PathError::invalid_str(s),
        Value::Bool(b) => PathError::invalid_bool(*b),
        Value::Number(n) => PathError::invalid_display(fmt_number(n)),
        other => PathError::invalid_display(other),
    }
}

fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
}

fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

/// Shortest rendering: `4` for an integral float, `5.3` otherwise.
fn fmt_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

impl Validate for Schema {
    fn validate(&mut self) -> Result<(), PathError> {
        trim_opt(&mut self.description);

        match &self.data_type {
            None if !self.has_composition() => return Err(PathError::Required.field("type")),
            None => {}
            Some(ty) => ty.validate().at_field("type")?,
        }

        self.validate_format().at_field("format")?;

        self.all_of.validate().at_field("allOf")?;
        self.any_of.validate().at_field("anyOf")?;
        self.one_of.validate().at_field("oneOf")?;

        self.validate_numbers()?;
        self.validate_strings()?;
        self.validate_enum()?;
        self.validate_array()?;
        self.validate_object()?;
        self.validate_default()?;

        self.extensions.validate()
    }
}

impl Walk for Schema {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("allOf", |loc| self.all_of.walk(loc, v))?;
        loc.field("anyOf", |loc| self.any_of.walk(loc, v))?;
        loc.field("oneOf", |loc| self.one_of.walk(loc, v))?;
        loc.field("items", |loc| self.items.walk(loc, v))?;
        loc.field("properties", |loc| self.properties.walk(loc, v))?;
        if let Some(AdditionalProperties::Schema(schema)) = &mut self.additional_properties {
            loc.field("additionalProperties", |loc| schema.walk(loc, v))?;
        }
        Ok(())
    }
}

impl SortMaps for Schema {
    fn sort_maps(&mut self) {
        self.all_of.sort_maps();
        self.any_of.sort_maps();
        self.one_of.sort_maps();
        self.items.sort_maps();
        self.properties.sort_maps();
        if let Some(AdditionalProperties::Schema(schema)) = &mut self.additional_properties {
            schema.sort_maps();
        }
        self.extensions.sort();
    }
}
