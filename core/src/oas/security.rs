//! # Security
//!
//! Security Scheme, OAuth Flows and Security Requirement objects.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::enums::{SecuritySchemeIn, SecuritySchemeType};
use crate::oas::extensions::Extensions;
use crate::oas::reference::RefOr;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{fix_scheme, require, trim_opt, Validate};
use crate::ordmap::OrdMap;
use crate::resolver::walk::{Location, Visitor, Walk};
use serde::{Deserialize, Serialize};

/// A security scheme or a reference to one.
pub type SecuritySchemeRef = RefOr<SecurityScheme>;

/// Named security schemes.
pub type SecuritySchemes = OrdMap<String, SecuritySchemeRef>;

/// A Security Scheme Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    /// Kind of the scheme. Required.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<SecuritySchemeType>,
    /// Brief description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Header, query or cookie name of an API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Location of an API key.
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SecuritySchemeIn>,
    /// HTTP authorization scheme (`basic`, `bearer`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Hint on how a bearer token is formatted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    /// OAuth 2 flows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,
    /// OpenID Connect discovery URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

fn require_opt(value: &Option<String>, field: &str) -> Result<(), PathError> {
    require(value.as_deref().unwrap_or_default()).at_field(field)
}

impl Validate for SecurityScheme {
    fn validate(&mut self) -> Result<(), PathError> {
        let Some(scheme_type) = &self.scheme_type else {
            return Err(PathError::Required.field("type"));
        };
        scheme_type.validate().at_field("type")?;

        trim_opt(&mut self.description);

        match scheme_type {
            SecuritySchemeType::ApiKey => {
                require_opt(&self.name, "name")?;
                let Some(location) = &self.location else {
                    return Err(PathError::Required.field("in"));
                };
                location.validate().at_field("in")?;
            }
            SecuritySchemeType::Http => require_opt(&self.scheme, "scheme")?,
            SecuritySchemeType::OAuth2 => {
                let Some(flows) = &mut self.flows else {
                    return Err(PathError::Required.field("flows"));
                };
                flows.validate().at_field("flows")?;
            }
            SecuritySchemeType::OpenIdConnect => {
                require_opt(&self.open_id_connect_url, "openIdConnectUrl")?;
                if let Some(url) = &mut self.open_id_connect_url {
                    fix_scheme(url);
                }
            }
            SecuritySchemeType::MutualTls | SecuritySchemeType::Other(_) => {}
        }

        self.extensions.validate()
    }
}

impl Walk for SecurityScheme {
    fn walk<V: Visitor>(&mut self, _: &mut Location, _: &mut V) -> Result<(), PathError> {
        Ok(())
    }
}

impl SortMaps for SecurityScheme {
    fn sort_maps(&mut self) {
        self.flows.sort_maps();
        self.extensions.sort();
    }
}

/// The flows an OAuth 2 scheme supports.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    /// Implicit flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    /// Resource owner password flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    /// Client credentials flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,
    /// Authorization code flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Validate for OAuthFlows {
    fn validate(&mut self) -> Result<(), PathError> {
        if let Some(flow) = &mut self.implicit {
            flow.check(true, false).at_field("implicit")?;
        }
        if let Some(flow) = &mut self.password {
            flow.check(false, true).at_field("password")?;
        }
        if let Some(flow) = &mut self.client_credentials {
            flow.check(false, true).at_field("clientCredentials")?;
        }
        if let Some(flow) = &mut self.authorization_code {
            flow.check(true, true).at_field("authorizationCode")?;
        }
        self.extensions.validate()
    }
}

impl SortMaps for OAuthFlows {
    fn sort_maps(&mut self) {
        self.implicit.sort_maps();
        self.password.sort_maps();
        self.client_credentials.sort_maps();
        self.authorization_code.sort_maps();
        self.extensions.sort();
    }
}

/// Scope name to short description.
pub type Scopes = OrdMap<String, String>;

/// Configuration of a single OAuth flow. Which URLs are required depends on the
/// flow it is used for.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    /// Authorization endpoint (implicit, authorizationCode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    /// Token endpoint (password, clientCredentials, authorizationCode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    /// Refresh endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    /// Available scopes. Required, may be empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Scopes>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl OAuthFlow {
    fn check(&mut self, authorization: bool, token: bool) -> Result<(), PathError> {
        if authorization {
            require_opt(&self.authorization_url, "authorizationUrl")?;
        }
        if token {
            require_opt(&self.token_url, "tokenUrl")?;
        }
        if self.scopes.is_none() {
            return Err(PathError::Required.field("scopes"));
        }
        for url in [
            &mut self.authorization_url,
            &mut self.token_url,
            &mut self.refresh_url,
        ]
        .into_iter()
        .flatten()
        {
            fix_scheme(url);
        }
        self.extensions.validate()
    }
}

impl SortMaps for OAuthFlow {
    fn sort_maps(&mut self) {
        self.scopes.sort_maps();
        self.extensions.sort();
    }
}

/// Scheme name to required scopes. An empty object means anonymous access.
pub type SecurityRequirement = OrdMap<String, Vec<String>>;

/// Checks a `security` list: names must be non-empty and, when `defined` is
/// given, declared in `components.securitySchemes`.
pub(crate) fn validate_security(
    requirements: &[SecurityRequirement],
    defined: Option<&SecuritySchemes>,
) -> Result<(), PathError> {
    for (i, requirement) in requirements.iter().enumerate() {
        for name in requirement.keys() {
            if name.is_empty() {
                return Err(PathError::message("empty security scheme name")
                    .key("")
                    .index(i));
            }
            if defined.is_some_and(|schemes| !schemes.contains_key(name)) {
                return Err(PathError::invalid_str(name)
                    .with_message("not defined in components.securitySchemes")
                    .key(name.as_str())
                    .index(i));
            }
        }
    }
    Ok(())
}
