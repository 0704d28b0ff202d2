//! Parameter Object and the parameter lists of path items and operations.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::enums::{ParameterLocation, ParameterStyle};
use crate::oas::example::{validate_examples, Examples};
use crate::oas::extensions::{present, Extensions};
use crate::oas::header::{validate_explode, validate_schema_or_content};
use crate::oas::media::Content;
use crate::oas::reference::RefOr;
use crate::oas::schema::SchemaRef;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{require, trim_opt, Validate};
use crate::ordmap::OrdMap;
use crate::resolver::walk::{Location, Visitor, Walk};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A parameter or a reference to one.
pub type ParameterRef = RefOr<Parameter>;

/// Named reusable parameters.
pub type Parameters = OrdMap<String, ParameterRef>;

/// A Parameter Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Case sensitive name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Location of the parameter.
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,
    /// Brief description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is mandatory. Must be true for path parameters.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Whether the parameter is being phased out.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Allows sending an empty value. Query parameters only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_empty_value: bool,
    /// Serialization style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ParameterStyle>,
    /// Separate parameters for array items and object members.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub explode: bool,
    /// Allows reserved characters unescaped. Query parameters only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_reserved: bool,
    /// Type of the parameter. Exclusive with `content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    /// Literal example. Exclusive with `examples`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Named examples. Exclusive with `example`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Examples>,
    /// Single entry media type map. Exclusive with `schema`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Parameter {
    /// A parameter with a name and location and nothing else.
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            required: location == ParameterLocation::Path,
            location: Some(location),
            ..Self::default()
        }
    }

    fn is_query(&self) -> bool {
        self.location == Some(ParameterLocation::Query)
    }
}

impl Validate for Parameter {
    fn validate(&mut self) -> Result<(), PathError> {
        require(&self.name).at_field("name")?;

        let Some(location) = &self.location else {
            return Err(PathError::Required.field("in"));
        };
        location.validate().at_field("in")?;
        if *location == ParameterLocation::Path && !self.required {
            return Err(PathError::invalid_bool(false)
                .with_message("must be true for path parameters")
                .field("required"));
        }

        trim_opt(&mut self.description);

        validate_schema_or_content(&mut self.schema, &mut self.content)?;

        let location = location.as_str();
        if self.allow_empty_value && !self.is_query() {
            return Err(PathError::invalid_bool(true)
                .with_message(format!(
                    "can only be true for query parameters, got {location:?}"
                ))
                .field("allowEmptyValue"));
        }
        if self.allow_reserved && !self.is_query() {
            return Err(PathError::invalid_bool(true)
                .with_message(format!("only applies to query parameters, got {location:?}"))
                .field("allowReserved"));
        }

        if let Some(style) = &self.style {
            style.validate().at_field("style")?;
        }
        validate_explode(self.explode, &self.schema).at_field("explode")?;

        if self.example.is_some() && self.examples.is_some() {
            return Err(PathError::message(
                "example and examples are mutually exclusive",
            ));
        }
        validate_examples(&mut self.examples).at_field("examples")?;

        self.extensions.validate()
    }
}

impl Walk for Parameter {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("schema", |loc| self.schema.walk(loc, v))?;
        loc.field("examples", |loc| self.examples.walk(loc, v))?;
        loc.field("content", |loc| self.content.walk(loc, v))
    }
}

impl SortMaps for Parameter {
    fn sort_maps(&mut self) {
        self.schema.sort_maps();
        self.examples.sort_maps();
        self.content.sort_maps();
        self.extensions.sort();
    }
}

/// The `parameters` list of a path item or operation.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterList(pub Vec<ParameterRef>);

impl ParameterList {
    /// Whether the list has no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the parameters in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParameterRef> {
        self.0.iter()
    }
}

impl From<Vec<ParameterRef>> for ParameterList {
    fn from(list: Vec<ParameterRef>) -> Self {
        Self(list)
    }
}

impl Validate for ParameterList {
    /// Each `(name, in)` pair may only occur once. Referenced parameters are
    /// checked through their resolved target; unresolved ones are skipped.
    fn validate(&mut self) -> Result<(), PathError> {
        let mut seen: HashMap<(String, String), PathError> = HashMap::with_capacity(self.len());

        for (i, param) in self.0.iter_mut().enumerate() {
            let id = param.with(|p| {
                let location = p.location.as_ref().map_or("", ParameterLocation::as_str);
                (p.name.clone(), location.to_string())
            });
            if let Some((name, location)) = id {
                let not_unique = PathError::invalid_str(&name)
                    .with_message(format!("not unique in {location}"))
                    .field("name")
                    .index(i);
                if let Some(previous) = seen.remove(&(name.clone(), location.clone())) {
                    return Err(PathError::Join(vec![previous, not_unique]));
                }
                seen.insert((name, location), not_unique);
            }

            param.validate().at_index(i)?;
        }
        Ok(())
    }
}

impl Walk for ParameterList {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        self.0.walk(loc, v)
    }
}

impl SortMaps for ParameterList {
    fn sort_maps(&mut self) {
        self.0.sort_maps();
    }
}
