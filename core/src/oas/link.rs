//! Link Object: design-time relations between responses and operations.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::extensions::{present, Extensions};
use crate::oas::reference::RefOr;
use crate::oas::server::Server;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{trim_opt, validate_key, Validate};
use crate::ordmap::OrdMap;
use crate::resolver::walk::{Location, Visitor, Walk};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A link or a reference to one.
pub type LinkRef = RefOr<Link>;

/// Links keyed by short name.
pub type Links = OrdMap<String, LinkRef>;

/// Parameter name to constant or runtime expression (`$request.path.id`).
pub type LinkParameters = OrdMap<String, Value>;

/// A Link Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// URI reference to an operation. Exclusive with `operationId`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_ref: Option<String>,
    /// Name of an existing operation. Exclusive with `operationRef`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Values passed to the linked operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<LinkParameters>,
    /// Body passed to the linked operation.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    /// Description of the link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server used by the linked operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<Server>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Link {
    /// A link to the operation with the given id.
    pub fn to_operation(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: Some(operation_id.into()),
            ..Self::default()
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl Validate for Link {
    fn validate(&mut self) -> Result<(), PathError> {
        let has_ref = self.operation_ref.as_ref().is_some_and(|s| !s.is_empty());
        let has_id = self.operation_id.as_ref().is_some_and(|s| !s.is_empty());
        match (has_ref, has_id) {
            (true, true) => {
                return Err(PathError::message(
                    "operationRef and operationId are mutually exclusive",
                ))
            }
            (false, false) => {
                return Err(PathError::message("operationRef or operationId must be set"))
            }
            _ => {}
        }

        if let Some(params) = &self.parameters {
            for (name, value) in params.by_index() {
                if is_blank(value) {
                    return Err(PathError::Required.key(name.as_str()).field("parameters"));
                }
            }
        }

        trim_opt(&mut self.description);
        self.server.validate().at_field("server")?;

        self.extensions.validate()
    }
}

impl Walk for Link {
    fn walk<V: Visitor>(&mut self, _: &mut Location, _: &mut V) -> Result<(), PathError> {
        Ok(())
    }
}

impl SortMaps for Link {
    fn sort_maps(&mut self) {
        self.parameters.sort_maps();
        self.server.sort_maps();
        self.extensions.sort();
    }
}

/// Validates a `links` map. Bad names are reported as keys (`[" "]`), link
/// errors under the name as a field (`MyLink.server.url`).
pub(crate) fn validate_links(links: &mut Links) -> Result<(), PathError> {
    for (name, link) in links.by_index_mut() {
        validate_key(name).at_key(name)?;
        link.validate().at_field(name)?;
    }
    Ok(())
}
