//! Example Object.

use crate::errpath::PathError;
use crate::oas::extensions::{present, Extensions};
use crate::oas::reference::RefOr;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{trim_opt, validate_keyed_map, Validate};
use crate::ordmap::OrdMap;
use crate::resolver::walk::{Location, Visitor, Walk};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An example or a reference to one.
pub type ExampleRef = RefOr<Example>;

/// Named examples.
pub type Examples = OrdMap<String, ExampleRef>;

/// An Example Object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Embedded literal example.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// URI of a literal example.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Validate for Example {
    fn validate(&mut self) -> Result<(), PathError> {
        trim_opt(&mut self.description);

        if self.value.is_some() && self.external_value.is_some() {
            return Err(PathError::message(
                "value and externalValue are mutually exclusive",
            ));
        }

        self.extensions.validate()
    }
}

impl Walk for Example {
    fn walk<V: Visitor>(&mut self, _: &mut Location, _: &mut V) -> Result<(), PathError> {
        Ok(())
    }
}

impl SortMaps for Example {
    fn sort_maps(&mut self) {
        self.extensions.sort();
    }
}

/// Validates an `examples` map, keys included.
pub(crate) fn validate_examples(examples: &mut Option<Examples>) -> Result<(), PathError> {
    match examples {
        Some(map) => validate_keyed_map(map),
        None => Ok(()),
    }
}
