#![deny(missing_docs)]

//! # OpenAPI Document
//!
//! The root object. Besides validating its own members it performs the checks
//! that need the whole tree: the document must describe something, and every
//! security requirement must name a scheme declared in `components`.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::components::Components;
use crate::oas::extensions::Extensions;
use crate::oas::info::{validate_tags, ExternalDocs, Info, Tag};
use crate::oas::paths::{validate_paths, validate_webhooks, PathItems, Paths};
use crate::oas::security::{validate_security, SecurityRequirement, SecuritySchemes};
use crate::oas::server::Server;
use crate::oas::sort::SortMaps;
use crate::oas::validation::Validate;
use crate::resolver::walk::{Location, Visitor, Walk};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// The only JSON Schema dialect accepted for `jsonSchemaDialect`.
pub const DIALECT_BASE: &str = "https://spec.openapis.org/oas/3.1/dialect/base";

/// Terminal message for a document without paths, webhooks or components.
pub const ERR_EMPTY_DOCUMENT: &str =
    "empty document: at least one of paths, webhooks or components must be set";

fn version_re() -> &'static Regex {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    VERSION_RE.get_or_init(|| Regex::new(r"^3\.(0|1)\.\d+(-.+)?$").expect("Invalid regex constant"))
}

/// An OpenAPI 3.0 or 3.1 document.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Version of the OpenAPI Specification the document uses.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub openapi: String,
    /// API metadata. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    /// Default `$schema` for Schema Objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema_dialect: Option<String>,
    /// Connectivity information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// Available endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Paths>,
    /// Incoming requests the API consumer may receive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhooks: Option<PathItems>,
    /// Reusable objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Default security requirements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Tag metadata.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Additional documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Document {
    /// A `3.1.0` document with the given metadata and nothing else.
    pub fn new(info: Info) -> Self {
        Self {
            openapi: "3.1.0".to_string(),
            info: Some(info),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.paths.as_ref().map_or(true, |p| p.is_empty())
            && self.webhooks.as_ref().map_or(true, |w| w.is_empty())
            && self.components.as_ref().map_or(true, Components::is_empty)
    }

    fn validate_version(&self) -> Result<(), PathError> {
        if self.openapi.is_empty() {
            return Err(PathError::Required);
        }
        if !version_re().is_match(&self.openapi) {
            return Err(PathError::invalid_str(&self.openapi)
                .with_message("must be a valid version (3.0.x or 3.1.x)"));
        }
        Ok(())
    }

    /// Every security requirement, top-level or per operation, must name a
    /// declared scheme.
    fn validate_security_names(&self) -> Result<(), PathError> {
        let empty = SecuritySchemes::new();
        let schemes = self
            .components
            .as_ref()
            .map_or(&empty, |c| &c.security_schemes);

        if let Some(security) = &self.security {
            validate_security(security, Some(schemes)).at_field("security")?;
        }

        if let Some(paths) = &self.paths {
            for (path, item) in paths.by_index() {
                for (label, op) in item.operations() {
                    if let Some(security) = &op.security {
                        validate_security(security, Some(schemes))
                            .at_field("security")
                            .at_field(label)
                            .at_key(path.as_str())
                            .at_field("paths")?;
                    }
                }
            }
        }

        if let Some(webhooks) = &self.webhooks {
            for (name, item) in webhooks.by_index() {
                let checked = item.with(|item| {
                    item.operations().try_for_each(|(label, op)| match &op.security {
                        Some(security) => validate_security(security, Some(schemes))
                            .at_field("security")
                            .at_field(label),
                        None => Ok(()),
                    })
                });
                checked
                    .unwrap_or(Ok(()))
                    .at_key(name)
                    .at_field("webhooks")?;
            }
        }
        Ok(())
    }
}

impl Validate for Document {
    fn validate(&mut self) -> Result<(), PathError> {
        self.validate_version().at_field("openapi")?;

        match &mut self.info {
            Some(info) => info.validate().at_field("info")?,
            None => return Err(PathError::Required.field("info")),
        }

        if let Some(dialect) = &self.json_schema_dialect {
            if dialect != DIALECT_BASE {
                return Err(PathError::invalid_str(dialect)
                    .with_allowed([DIALECT_BASE])
                    .field("jsonSchemaDialect"));
            }
        }

        self.servers.validate().at_field("servers")?;
        if let Some(paths) = &mut self.paths {
            validate_paths(paths).at_field("paths")?;
        }
        if let Some(webhooks) = &mut self.webhooks {
            validate_webhooks(webhooks).at_field("webhooks")?;
        }
        self.components.validate().at_field("components")?;

        if self.is_empty() {
            return Err(PathError::message(ERR_EMPTY_DOCUMENT));
        }

        self.validate_security_names()?;
        validate_tags(&mut self.tags).at_field("tags")?;
        self.external_docs.validate().at_field("externalDocs")?;

        self.extensions.validate()
    }
}

impl Walk for Document {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("components", |loc| self.components.walk(loc, v))?;
        loc.field("paths", |loc| self.paths.walk(loc, v))?;
        loc.field("webhooks", |loc| self.webhooks.walk(loc, v))
    }
}

impl SortMaps for Document {
    fn sort_maps(&mut self) {
        self.info.sort_maps();
        self.servers.sort_maps();
        self.paths.sort_maps();
        self.webhooks.sort_maps();
        self.components.sort_maps();
        self.security.sort_maps();
        self.tags.sort_maps();
        self.external_docs.sort_maps();
        self.extensions.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn err(value: Value) -> String {
        let mut doc: Document = serde_json::from_value(value).unwrap();
        doc.validate().unwrap_err().to_string()
    }

    fn base() -> Value {
        json!({"openapi": "3.1.0", "info": {"title": "Sample API", "version": "1.0.0"}})
    }

    fn with(extra: Value) -> Value {
        let mut doc = base();
        if let (Some(doc), Some(extra)) = (doc.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                doc.insert(k.clone(), v.clone());
            }
        }
        doc
    }

    #[test]
    fn test_minimal_document_is_valid() {
        let mut doc: Document = serde_json::from_value(with(json!({"paths": {"/": {}}}))).unwrap();
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_root_rules() {
        assert_eq!(err(json!({})), "openapi is required");
        assert_eq!(
            err(json!({"openapi": "foo"})),
            r#"openapi ("foo") is invalid: must be a valid version (3.0.x or 3.1.x)"#
        );
        assert_eq!(err(json!({"openapi": "3.1.0"})), "info is required");
        assert_eq!(
            err(json!({"openapi": "3.1.0", "info": {}})),
            "info.title is required"
        );
        assert_eq!(
            err(with(json!({"jsonSchemaDialect": "https://example.com"}))),
            r#"jsonSchemaDialect ("https://example.com") is invalid, must be one of: "https://spec.openapis.org/oas/3.1/dialect/base""#
        );
        assert_eq!(err(with(json!({"servers": [{}]}))), "servers[0].url is required");
    }

    #[test]
    fn test_paths_webhooks_and_empty_document() {
        assert_eq!(
            err(with(json!({"paths": {"": {}}}))),
            r#"paths[""]: path must not be empty"#
        );
        assert_eq!(
            err(with(json!({"webhooks": {"myWebhook": {"parameters": [{"name": "foo"}]}}}))),
            r#"webhooks["myWebhook"].parameters[0].in is required"#
        );
        assert_eq!(err(base()), ERR_EMPTY_DOCUMENT);
        assert_eq!(err(with(json!({"components": {}}))), ERR_EMPTY_DOCUMENT);
    }

    #[test]
    fn test_version_pattern() {
        for version in ["3.0.3", "3.1.0", "3.1.1-rc1"] {
            let mut doc = Document {
                openapi: version.to_string(),
                ..Document::new(Info::new("t", "1"))
            };
            doc.paths = Some([("/".into(), Default::default())].into_iter().collect());
            assert!(doc.validate().is_ok(), "{version}");
        }
        assert!(err(with(json!({"openapi": "2.0", "paths": {"/": {}}}))).starts_with("openapi (\"2.0\")"));
    }

    #[test]
    fn test_security_names_must_be_declared() {
        assert_eq!(
            err(with(json!({"paths": {"/": {}}, "security": [{"api_key": []}]}))),
            r#"security[0]["api_key"] ("api_key") is invalid: not defined in components.securitySchemes"#
        );
        assert_eq!(
            err(with(json!({
                "paths": {"/pets": {"get": {"security": [{"oauth": ["read"]}]}}},
                "components": {"securitySchemes": {"api_key": {"type": "apiKey", "name": "k", "in": "header"}}}
            }))),
            r#"paths["/pets"].GET.security[0]["oauth"] ("oauth") is invalid: not defined in components.securitySchemes"#
        );
        assert_eq!(
            err(with(json!({
                "webhooks": {"newPet": {"post": {"security": [{"oauth": []}]}}}
            }))),
            r#"webhooks["newPet"].POST.security[0]["oauth"] ("oauth") is invalid: not defined in components.securitySchemes"#
        );

        let mut doc: Document = serde_json::from_value(with(json!({
            "paths": {"/": {"get": {"security": [{}]}}},
            "security": [{"api_key": []}],
            "components": {"securitySchemes": {"api_key": {"type": "apiKey", "name": "k", "in": "header"}}}
        })))
        .unwrap();
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_tags_and_external_docs() {
        assert_eq!(
            err(with(json!({"paths": {"/": {}}, "tags": [{"name": "a"}, {"name": "a"}]}))),
            "tags[0].name (\"a\") is invalid: not unique\n\
             tags[1].name (\"a\") is invalid: not unique"
        );
        assert_eq!(
            err(with(json!({"paths": {"/": {}}, "externalDocs": {}}))),
            "externalDocs.url is required"
        );
    }
}
