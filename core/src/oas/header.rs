//! Header Object, and the schema-or-content rules it shares with parameters.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::enums::{DataType, ParameterStyle};
use crate::oas::example::{validate_examples, Examples};
use crate::oas::extensions::{present, Extensions};
use crate::oas::media::{validate_content, Content};
use crate::oas::reference::RefOr;
use crate::oas::schema::SchemaRef;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{trim_opt, Validate};
use crate::ordmap::OrdMap;
use crate::resolver::walk::{Location, Visitor, Walk};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A header or a reference to one.
pub type HeaderRef = RefOr<Header>;

/// Headers keyed by name.
pub type Headers = OrdMap<String, HeaderRef>;

/// A Header Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Brief description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the header is mandatory.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Whether the header is being phased out.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Type of the header. Exclusive with `content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    /// Serialization style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ParameterStyle>,
    /// Separate values for array items and object members.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub explode: bool,
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

impl Validate for Header {
    fn validate(&mut self) -> Result<(), PathError> {
        trim_opt(&mut self.description);

        validate_schema_or_content(&mut self.schema, &mut self.content)?;
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

impl Walk for Header {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("schema", |loc| self.schema.walk(loc, v))?;
        loc.field("examples", |loc| self.examples.walk(loc, v))?;
        loc.field("content", |loc| self.content.walk(loc, v))
    }
}

impl SortMaps for Header {
    fn sort_maps(&mut self) {
        self.schema.sort_maps();
        self.examples.sort_maps();
        self.content.sort_maps();
        self.extensions.sort();
    }
}

/// Exactly one of `schema` and a single entry `content` must be set.
pub(crate) fn validate_schema_or_content(
    schema: &mut Option<SchemaRef>,
    content: &mut Option<Content>,
) -> Result<(), PathError> {
    match (schema, content) {
        (Some(_), Some(_)) => Err(PathError::message(
            "schema and content are mutually exclusive",
        )),
        (Some(schema), None) => schema.validate().at_field("schema"),
        (None, None) => Err(PathError::message("schema or content is required")),
        (None, Some(content)) => {
            if content.len() != 1 {
                return Err(PathError::invalid()
                    .with_message(format!(
                        "must contain exactly one entry, got {}",
                        content.len()
                    ))
                    .field("content"));
            }
            validate_content(content).at_field("content")
        }
    }
}

/// `explode` only applies to array and object schemas. An unresolved schema
/// reference is not checked.
pub(crate) fn validate_explode(
    explode: bool,
    schema: &Option<SchemaRef>,
) -> Result<(), PathError> {
    if !explode {
        return Ok(());
    }
    let Some(schema) = schema else {
        return Err(PathError::invalid_bool(true)
            .with_message("property has no effect when schema is not present"));
    };
    match schema.with(|s| s.data_type.clone()) {
        None | Some(Some(DataType::Array | DataType::Object)) => Ok(()),
        Some(ty) => {
            let name = ty.as_ref().map_or("", DataType::as_str).to_string();
            Err(PathError::invalid_bool(true).with_message(format!(
                "property has no effect when schema type is not array or object, got {name:?}"
            )))
        }
    }
}
