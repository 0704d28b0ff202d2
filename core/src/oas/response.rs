//! # Responses
//!
//! Response Object, the status code keyed map of an operation and the
//! [`StatusCode`] key type.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::extensions::Extensions;
use crate::oas::header::Headers;
use crate::oas::link::{validate_links, Links};
use crate::oas::media::{validate_content, Content};
use crate::oas::reference::RefOr;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{trim, validate_keyed_map, Validate};
use crate::ordmap::OrdMap;
use crate::resolver::walk::{walk_named, Location, Visitor, Walk};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A response or a reference to one.
pub type ResponseRef = RefOr<Response>;

/// Named reusable responses.
pub type Responses = OrdMap<String, ResponseRef>;

/// Expected responses of an operation.
pub type OperationResponses = OrdMap<StatusCode, ResponseRef>;

/// A Response Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Description of the response. Required.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Response headers keyed by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Media type keyed payload descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Operations reachable from this response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Response {
    /// A response with only a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

impl Validate for Response {
    fn validate(&mut self) -> Result<(), PathError> {
        trim(&mut self.description);
        if self.description.is_empty() {
            return Err(PathError::Required.field("description"));
        }

        if let Some(headers) = &mut self.headers {
            validate_keyed_map(headers).at_field("headers")?;
        }
        if let Some(content) = &mut self.content {
            validate_content(content).at_field("content")?;
        }
        if let Some(links) = &mut self.links {
            validate_links(links).at_field("links")?;
        }

        self.extensions.validate()
    }
}

impl Walk for Response {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("headers", |loc| self.headers.walk(loc, v))?;
        loc.field("content", |loc| self.content.walk(loc, v))?;
        if let Some(links) = &mut self.links {
            loc.field("links", |loc| walk_named(links, loc, v))?;
        }
        Ok(())
    }
}

impl SortMaps for Response {
    fn sort_maps(&mut self) {
        self.headers.sort_maps();
        self.content.sort_maps();
        self.links.sort_maps();
        self.extensions.sort();
    }
}

/// An HTTP status code, a `1XX`..`5XX` range or `default`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(String);

impl StatusCode {
    /// The fallback for every code not covered individually.
    pub const DEFAULT: &'static str = "default";

    /// Wraps a status code text.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u16> {
        match self.0.as_bytes() {
            [b'1'..=b'5', b'0'..=b'9', b'0'..=b'9'] => self.0.parse().ok(),
            _ => None,
        }
    }

    fn range_class(&self) -> Option<u8> {
        match self.0.as_bytes() {
            [class @ b'1'..=b'5', b'X', b'X'] => Some(class - b'0'),
            _ => None,
        }
    }

    /// Whether the code or range is `2xx`.
    pub fn is_success(&self) -> bool {
        self.numeric().is_some_and(|code| (200..300).contains(&code))
            || self.range_class() == Some(2)
    }

    /// Canonical reason phrase of a numeric code (`Not Found`).
    pub fn status_text(&self) -> Option<&'static str> {
        let code = http::StatusCode::from_u16(self.numeric()?).ok()?;
        code.canonical_reason()
    }

    /// Accepts `default`, `1XX`..`5XX` and `100`..`599`.
    pub fn validate(&self) -> Result<(), PathError> {
        if self.0 == Self::DEFAULT || self.range_class().is_some() || self.numeric().is_some() {
            return Ok(());
        }
        Err(PathError::message(format!("invalid status code {:?}", self.0)))
    }
}

impl Borrow<str> for StatusCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StatusCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code.to_string())
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates the `responses` of an operation, codes first.
pub(crate) fn validate_operation_responses(
    responses: &mut OperationResponses,
) -> Result<(), PathError> {
    for (code, response) in responses.by_index_mut() {
        code.validate().at_key(code.as_str())?;
        response.validate().at_key(code.as_str())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes() {
        for ok in ["default", "200", "404", "2XX", "5XX", "100", "599"] {
            assert!(StatusCode::from(ok).validate().is_ok(), "{ok}");
        }
        for bad in ["600", "99", "6XX", "2xx", "OK", "+200", "0200", "2000", " 200"] {
            assert_eq!(
                StatusCode::from(bad).validate().unwrap_err().to_string(),
                format!("invalid status code {bad:?}")
            );
        }
        assert!(StatusCode::from(204).is_success());
        assert!(StatusCode::from("2XX").is_success());
        assert!(!StatusCode::from("default").is_success());
        assert!(!StatusCode::from(404).is_success());
        assert_eq!(StatusCode::from(404).status_text(), Some("Not Found"));
        assert_eq!(StatusCode::from("default").status_text(), None);
    }

    #[test]
    fn test_response_description() {
        let mut response: Response = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            response.validate().unwrap_err().to_string(),
            "description is required"
        );
        let mut response = Response::new("  ok \n");
        assert!(response.validate().is_ok());
        assert_eq!(response.description, "ok");
    }

    #[test]
    fn test_response_children() {
        let mut response: Response = serde_json::from_value(json!({
            "description": "ok",
            "headers": {"X-Rate-Limit": {"schema": {"type": "integer"}}},
            "links": {"GetUser": {}}
        }))
        .unwrap();
        assert_eq!(
            response.validate().unwrap_err().to_string(),
            "links.GetUser: operationRef or operationId must be set"
        );

        let mut response: Response = serde_json::from_value(json!({
            "description": "ok",
            "content": {"application/json": {"schema": {"type": "object"}}},
            "headers": {"X-Rate-Limit": {}}
        }))
        .unwrap();
        assert_eq!(
            response.validate().unwrap_err().to_string(),
            r#"headers["X-Rate-Limit"]: schema or content is required"#
        );
    }

    #[test]
    fn test_operation_responses_order_and_codes() {
        let mut responses: OperationResponses = serde_json::from_value(json!({
            "200": {"description": "ok"},
            "default": {"description": "error"},
            "600": {"description": "odd"}
        }))
        .unwrap();
        let codes: Vec<&str> = responses.keys().map(StatusCode::as_str).collect();
        assert_eq!(codes, ["200", "default", "600"]);
        assert_eq!(
            validate_operation_responses(&mut responses)
                .unwrap_err()
                .to_string(),
            r#"["600"]: invalid status code "600""#
        );
    }
}
