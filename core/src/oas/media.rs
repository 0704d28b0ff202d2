//! # Content
//!
//! Media Type and Encoding objects, and the `content` maps keyed by media range.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::enums::ParameterStyle;
use crate::oas::example::{validate_examples, Examples};
use crate::oas::extensions::{present, Extensions};
use crate::oas::header::Headers;
use crate::oas::schema::SchemaRef;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{validate_keyed_map, Validate};
use crate::ordmap::OrdMap;
use crate::resolver::walk::{Location, Visitor, Walk};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

/// A media type or media type range, e.g. `application/json` or `text/*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRange(String);

impl MediaRange {
    /// `application/json`
    pub const JSON: &'static str = "application/json";

    /// Wraps a media range.
    pub fn new(range: impl Into<String>) -> Self {
        Self(range.into())
    }

    /// The media range text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the range and its parameters, reporting the first syntax error.
    pub fn validate(&self) -> Result<(), PathError> {
        parse_media_range(&self.0).map_err(PathError::message)
    }
}

impl Borrow<str> for MediaRange {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MediaRange {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MediaRange {
    fn from(range: &str) -> Self {
        Self(range.to_string())
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c)
}

fn consume_token(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_token_char(c)).unwrap_or(s.len());
    s.split_at(end)
}

fn consume_value(s: &str) -> Option<&str> {
    let Some(quoted) = s.strip_prefix('"') else {
        let (token, rest) = consume_token(s);
        return (!token.is_empty()).then_some(rest);
    };
    let mut escaped = false;
    for (i, c) in quoted.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(&quoted[i + 1..]),
            _ => {}
        }
    }
    None
}

/// `type "/" subtype *( ";" attribute "=" value )`, with the messages of the
/// common MIME parsers.
fn parse_media_range(s: &str) -> Result<(), &'static str> {
    let (kind, rest) = consume_token(s.trim_start());
    if kind.is_empty() {
        return Err("mime: no media type");
    }
    if rest.is_empty() {
        return Ok(());
    }
    let Some(rest) = rest.strip_prefix('/') else {
        return Err("mime: expected slash after first token");
    };
    let (subtype, mut rest) = consume_token(rest);
    if subtype.is_empty() {
        return Err("mime: expected token after slash");
    }

    let mut seen = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(());
        }
        let Some(param) = rest.strip_prefix(';') else {
            return Err("mime: invalid media parameter");
        };
        let param = param.trim_start();
        if param.trim_end().is_empty() {
            // trailing semicolon
            return Ok(());
        }
        let (name, after) = consume_token(param);
        let Some(after) = after.trim_start().strip_prefix('=') else {
            return Err("mime: invalid media parameter");
        };
        if name.is_empty() {
            return Err("mime: invalid media parameter");
        }
        let name = name.to_ascii_lowercase();
        if seen.contains(&name) {
            return Err("mime: duplicate parameter name");
        }
        seen.push(name);
        rest = consume_value(after.trim_start()).ok_or("mime: invalid media parameter")?;
    }
}

/// Media type keyed payload descriptions.
pub type Content = OrdMap<MediaRange, MediaType>;

/// Validates a `content` map: every key must parse as a media range.
pub(crate) fn validate_content(content: &mut Content) -> Result<(), PathError> {
    for (range, media) in content.by_index_mut() {
        range.validate().at_key(range.as_str())?;
        media.validate().at_key(range.as_str())?;
    }
    Ok(())
}

/// A Media Type Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    /// Literal example. Exclusive with `examples`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Named examples. Exclusive with `example`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Examples>,
    /// Per-property encoding of multipart and form bodies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encodings>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Validate for MediaType {
    fn validate(&mut self) -> Result<(), PathError> {
        self.schema.validate().at_field("schema")?;

        if self.example.is_some() && self.examples.is_some() {
            return Err(PathError::message(
                "example and examples are mutually exclusive",
            ));
        }
        validate_examples(&mut self.examples).at_field("examples")?;
        self.encoding.validate().at_field("encoding")?;

        self.extensions.validate()
    }
}

impl Walk for MediaType {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("schema", |loc| self.schema.walk(loc, v))?;
        loc.field("examples", |loc| self.examples.walk(loc, v))?;
        loc.field("encoding", |loc| self.encoding.walk(loc, v))
    }
}

impl SortMaps for MediaType {
    fn sort_maps(&mut self) {
        self.schema.sort_maps();
        self.examples.sort_maps();
        self.encoding.sort_maps();
        self.extensions.sort();
    }
}

/// Property name keyed encodings.
pub type Encodings = OrdMap<String, Encoding>;

/// An Encoding Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    /// Content type of the property, possibly a comma separated list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Extra headers of a multipart part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Serialization style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ParameterStyle>,
    /// Separate parameters per array item or object member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    /// Allow reserved characters unescaped.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_reserved: bool,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Validate for Encoding {
    fn validate(&mut self) -> Result<(), PathError> {
        if let Some(headers) = &mut self.headers {
            validate_keyed_map(headers).at_field("headers")?;
        }
        if let Some(style) = &self.style {
            style.validate().at_field("style")?;
        }
        self.extensions.validate()
    }
}

impl Walk for Encoding {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("headers", |loc| self.headers.walk(loc, v))
    }
}

impl SortMaps for Encoding {
    fn sort_maps(&mut self) {
        self.headers.sort_maps();
        self.extensions.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_range_parsing() {
        for ok in [
            "application/json",
            "text/*",
            "*/*",
            "foo",
            "text/plain; charset=utf-8",
            "multipart/form-data; boundary=\"a;b\"",
            "text/html;",
        ] {
            assert!(MediaRange::from(ok).validate().is_ok(), "{ok}");
        }
        assert_eq!(
            MediaRange::from("not a real media type")
                .validate()
                .unwrap_err()
                .to_string(),
            "mime: expected slash after first token"
        );
        assert_eq!(
            MediaRange::from("foo/bar; baz").validate().unwrap_err().to_string(),
            "mime: invalid media parameter"
        );
        assert_eq!(
            MediaRange::from("").validate().unwrap_err().to_string(),
            "mime: no media type"
        );
        assert_eq!(
            MediaRange::from("a/b; x=1; X=2").validate().unwrap_err().to_string(),
            "mime: duplicate parameter name"
        );
    }

    #[test]
    fn test_content_errors_are_keyed() {
        let mut content: Content =
            serde_json::from_value(json!({"foo/bar; baz": {}})).unwrap();
        assert_eq!(
            validate_content(&mut content).unwrap_err().to_string(),
            r#"["foo/bar; baz"]: mime: invalid media parameter"#
        );

        let mut content: Content =
            serde_json::from_value(json!({"application/json": {"schema": {}}})).unwrap();
        assert_eq!(
            validate_content(&mut content).unwrap_err().to_string(),
            r#"["application/json"].schema.type is required"#
        );
    }

    #[test]
    fn test_media_type_rules() {
        let mut media: MediaType = serde_json::from_value(json!({
            "example": 1,
            "examples": {"one": {"value": 1}}
        }))
        .unwrap();
        assert_eq!(
            media.validate().unwrap_err().to_string(),
            "example and examples are mutually exclusive"
        );

        let mut media: MediaType = serde_json::from_value(json!({
            "encoding": {"foo": {"style": "bar"}}
        }))
        .unwrap();
        assert_eq!(
            media.validate().unwrap_err().to_string(),
            r#"encoding["foo"].style ("bar") is invalid, must be one of: "matrix", "label", "form", "simple", "spaceDelimited", "pipeDelimited", "deepObject""#
        );
    }

    #[test]
    fn test_encoding_header_errors() {
        let mut encoding: Encoding = serde_json::from_value(json!({
            "contentType": "image/png, image/jpeg",
            "headers": {"foo": {}}
        }))
        .unwrap();
        assert_eq!(
            encoding.validate().unwrap_err().to_string(),
            r#"headers["foo"]: schema or content is required"#
        );
    }
}
