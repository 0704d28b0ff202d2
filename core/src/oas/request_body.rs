//! Request Body Object.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::extensions::Extensions;
use crate::oas::media::{validate_content, Content};
use crate::oas::reference::RefOr;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{trim_opt, Validate};
use crate::ordmap::OrdMap;
use crate::resolver::walk::{Location, Visitor, Walk};
use serde::{Deserialize, Serialize};

/// A request body or a reference to one.
pub type RequestBodyRef = RefOr<RequestBody>;

/// Named reusable request bodies.
pub type RequestBodies = OrdMap<String, RequestBodyRef>;

/// A Request Body Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Brief description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Media type keyed body descriptions. Required.
    #[serde(default)]
    pub content: Content,
    /// Whether the body is mandatory.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Validate for RequestBody {
    fn validate(&mut self) -> Result<(), PathError> {
        trim_opt(&mut self.description);

        if self.content.is_empty() {
            return Err(PathError::Required.field("content"));
        }
        validate_content(&mut self.content).at_field("content")?;

        self.extensions.validate()
    }
}

impl Walk for RequestBody {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("content", |loc| self.content.walk(loc, v))
    }
}

impl SortMaps for RequestBody {
    fn sort_maps(&mut self) {
        self.content.sort_maps();
        self.extensions.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_required() {
        let mut body: RequestBody =
            serde_json::from_value(json!({"description": "pet"})).unwrap();
        assert_eq!(body.validate().unwrap_err().to_string(), "content is required");
    }

    #[test]
    fn test_content_errors_are_wrapped() {
        let mut body: RequestBody = serde_json::from_value(json!({
            "content": {"application/json": {"schema": {"type": "foo"}}}
        }))
        .unwrap();
        assert_eq!(
            body.validate().unwrap_err().to_string(),
            r#"content["application/json"].schema.type ("foo") is invalid, must be one of: "integer", "number", "string", "array", "boolean", "object""#
        );
    }

    #[test]
    fn test_content_serialized_even_when_empty() {
        let body = RequestBody::default();
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"content":{}}"#);
    }
}
