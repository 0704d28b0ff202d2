//! # Components
//!
//! The registries of reusable objects. Every key must match
//! [`COMPONENT_KEY_PATTERN`](crate::oas::validation::COMPONENT_KEY_PATTERN), and
//! every inline value is registered under `#/components/<kind>/<name>` when a
//! document is resolved.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::example::Examples;
use crate::oas::extensions::Extensions;
use crate::oas::header::Headers;
use crate::oas::link::{validate_links, Links};
use crate::oas::parameter::Parameters;
use crate::oas::paths::{Callbacks, PathItems};
use crate::oas::request_body::RequestBodies;
use crate::oas::response::Responses;
use crate::oas::schema::SchemaRefs;
use crate::oas::security::SecuritySchemes;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{validate_keyed_map, Validate};
use crate::resolver::walk::{walk_named, Location, Visitor, Walk};
use serde::{Deserialize, Serialize};

/// The Components Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Reusable schemas.
    #[serde(default, skip_serializing_if = "SchemaRefs::is_empty")]
    pub schemas: SchemaRefs,
    /// Reusable responses.
    #[serde(default, skip_serializing_if = "Responses::is_empty")]
    pub responses: Responses,
    /// Reusable parameters.
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub parameters: Parameters,
    /// Reusable examples.
    #[serde(default, skip_serializing_if = "Examples::is_empty")]
    pub examples: Examples,
    /// Reusable request bodies.
    #[serde(default, skip_serializing_if = "RequestBodies::is_empty")]
    pub request_bodies: RequestBodies,
    /// Reusable headers.
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,
    /// Reusable security schemes.
    #[serde(default, skip_serializing_if = "SecuritySchemes::is_empty")]
    pub security_schemes: SecuritySchemes,
    /// Reusable links.
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    /// Reusable callbacks.
    #[serde(default, skip_serializing_if = "Callbacks::is_empty")]
    pub callbacks: Callbacks,
    /// Reusable path items.
    #[serde(default, skip_serializing_if = "PathItems::is_empty")]
    pub path_items: PathItems,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Components {
    /// Whether no registry holds an entry. Extensions do not count.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.responses.is_empty()
            && self.parameters.is_empty()
            && self.examples.is_empty()
            && self.request_bodies.is_empty()
            && self.headers.is_empty()
            && self.security_schemes.is_empty()
            && self.links.is_empty()
            && self.callbacks.is_empty()
            && self.path_items.is_empty()
    }
}

impl Validate for Components {
    fn validate(&mut self) -> Result<(), PathError> {
        validate_keyed_map(&mut self.schemas).at_field("schemas")?;
        validate_keyed_map(&mut self.responses).at_field("responses")?;
        validate_keyed_map(&mut self.parameters).at_field("parameters")?;
        validate_keyed_map(&mut self.examples).at_field("examples")?;
        validate_keyed_map(&mut self.request_bodies).at_field("requestBodies")?;
        validate_keyed_map(&mut self.headers).at_field("headers")?;
        validate_keyed_map(&mut self.security_schemes).at_field("securitySchemes")?;
        validate_links(&mut self.links).at_field("links")?;
        validate_keyed_map(&mut self.callbacks).at_field("callbacks")?;
        validate_keyed_map(&mut self.path_items).at_field("pathItems")?;

        self.extensions.validate()
    }
}

impl Walk for Components {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("schemas", |loc| self.schemas.walk(loc, v))?;
        loc.field("responses", |loc| self.responses.walk(loc, v))?;
        loc.field("parameters", |loc| self.parameters.walk(loc, v))?;
        loc.field("examples", |loc| self.examples.walk(loc, v))?;
        loc.field("requestBodies", |loc| self.request_bodies.walk(loc, v))?;
        loc.field("headers", |loc| self.headers.walk(loc, v))?;
        loc.field("securitySchemes", |loc| self.security_schemes.walk(loc, v))?;
        loc.field("links", |loc| walk_named(&mut self.links, loc, v))?;
        loc.field("callbacks", |loc| self.callbacks.walk(loc, v))?;
        loc.field("pathItems", |loc| self.path_items.walk(loc, v))
    }
}

impl SortMaps for Components {
    fn sort_maps(&mut self) {
        self.schemas.sort_maps();
        self.responses.sort_maps();
        self.parameters.sort_maps();
        self.examples.sort_maps();
        self.request_bodies.sort_maps();
        self.headers.sort_maps();
        self.security_schemes.sort_maps();
        self.links.sort_maps();
        self.callbacks.sort_maps();
        self.path_items.sort_maps();
        self.extensions.sort();
    }
}
