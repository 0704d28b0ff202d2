//! Server Object and URL template variables.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::extensions::Extensions;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{require, trim_opt, Validate};
use crate::ordmap::OrdMap;
use serde::{Deserialize, Serialize};

/// A server hosting the API.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// URL of the target host, possibly templated with `{variables}`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Host designation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Substitutions for the URL template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<ServerVariables>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Server {
    /// A server at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Validate for Server {
    fn validate(&mut self) -> Result<(), PathError> {
        require(&self.url).at_field("url")?;
        trim_opt(&mut self.description);
        self.variables.validate().at_field("variables")?;
        self.extensions.validate()
    }
}

impl SortMaps for Server {
    fn sort_maps(&mut self) {
        self.variables.sort_maps();
        self.extensions.sort();
    }
}

/// Variables keyed by the name used in the URL template.
pub type ServerVariables = OrdMap<String, ServerVariable>;

/// A Server Variable Object.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    /// Allowed substitution values. Must not be empty when present.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Value used when none is supplied.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
    /// Brief description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Validate for ServerVariable {
    fn validate(&mut self) -> Result<(), PathError> {
        if let Some(values) = &self.enum_values {
            if values.is_empty() {
                return Err(PathError::message("enum array must not be empty"));
            }
        }
        require(&self.default).at_field("default")?;
        if let Some(values) = &self.enum_values {
            if !values.contains(&self.default) {
                return Err(PathError::message(format!(
                    "default value {:?} must exist in the enum's values",
                    self.default
                )));
            }
        }
        trim_opt(&mut self.description);
        self.extensions.validate()
    }
}

impl SortMaps for ServerVariable {
    fn sort_maps(&mut self) {
        self.extensions.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn err(value: serde_json::Value) -> String {
        let mut server: Server = serde_json::from_value(value).unwrap();
        server.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_valid_server() {
        let mut server: Server = serde_json::from_value(json!({
            "url": "https://{env}.example.com/v1",
            "description": "Main ",
            "variables": {"env": {"default": "prod", "enum": ["prod", "staging"]}}
        }))
        .unwrap();
        assert!(server.validate().is_ok());
        assert_eq!(server.description.as_deref(), Some("Main"));
    }

    #[test]
    fn test_server_errors() {
        assert_eq!(err(json!({})), "url is required");
        assert_eq!(
            err(json!({"url": "/", "variables": {"env": {}}})),
            r#"variables["env"].default is required"#
        );
        assert_eq!(
            err(json!({"url": "/", "variables": {"env": {"default": "a", "enum": []}}})),
            r#"variables["env"]: enum array must not be empty"#
        );
        assert_eq!(
            err(json!({"url": "/", "variables": {"env": {"default": "x", "enum": ["a"]}}})),
            r#"variables["env"]: default value "x" must exist in the enum's values"#
        );
    }

    #[test]
    fn test_unknown_member_rejected() {
        let res = serde_json::from_value::<Server>(json!({"url": "/", "foo": 1}));
        assert!(res
            .unwrap_err()
            .to_string()
            .contains(r#"foo: unknown field or extension without "x-" prefix"#));
    }
}
