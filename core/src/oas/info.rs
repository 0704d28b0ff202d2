//! Metadata objects: Info, Contact, License, External Documentation and Tag.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::extensions::Extensions;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{fix_scheme, require, trim_opt, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Metadata about the API.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// Title of the API. Required.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL to the terms of service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    /// Contact for the exposed API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// License of the exposed API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    /// Version of the document, not of the OpenAPI specification. Required.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Info {
    /// Info with a title and version.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

impl Validate for Info {
    fn validate(&mut self) -> Result<(), PathError> {
        require(&self.title).at_field("title")?;
        require(&self.version).at_field("version")?;

        trim_opt(&mut self.summary);
        trim_opt(&mut self.description);
        if let Some(url) = &mut self.terms_of_service {
            fix_scheme(url);
        }

        self.contact.validate().at_field("contact")?;
        self.license.validate().at_field("license")?;

        self.extensions.validate()
    }
}

impl SortMaps for Info {
    fn sort_maps(&mut self) {
        self.extensions.sort();
        if let Some(contact) = &mut self.contact {
            contact.extensions.sort();
        }
        if let Some(license) = &mut self.license {
            license.extensions.sort();
        }
    }
}

/// Contact information.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Identifying name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// URL of the contact information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

fn email_re() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex constant")
    })
}

impl Validate for Contact {
    fn validate(&mut self) -> Result<(), PathError> {
        if let Some(url) = &mut self.url {
            fix_scheme(url);
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !email_re().is_match(email) {
                return Err(PathError::message(format!("invalid email: {email:?}")).field("email"));
            }
        }
        self.extensions.validate()
    }
}

/// License information.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    /// License name. Required.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// SPDX license expression. Exclusive with `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// License URL. Exclusive with `identifier`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Validate for License {
    fn validate(&mut self) -> Result<(), PathError> {
        require(&self.name).at_field("name")?;
        if self.url.is_some() && self.identifier.is_some() {
            return Err(PathError::message("url and identifier are mutually exclusive"));
        }
        self.extensions.validate()
    }
}

/// A reference to external documentation.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    /// Description of the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL of the target. Required.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Validate for ExternalDocs {
    fn validate(&mut self) -> Result<(), PathError> {
        require(&self.url).at_field("url")?;
        fix_scheme(&mut self.url);
        trim_opt(&mut self.description);
        self.extensions.validate()
    }
}

impl SortMaps for ExternalDocs {
    fn sort_maps(&mut self) {
        self.extensions.sort();
    }
}

/// Metadata for a tag used by operations.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag name. Required.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Description of the tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Additional documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Validate for Tag {
    fn validate(&mut self) -> Result<(), PathError> {
        require(&self.name).at_field("name")?;
        trim_opt(&mut self.description);
        self.external_docs.validate().at_field("externalDocs")?;
        self.extensions.validate()
    }
}

impl SortMaps for Tag {
    fn sort_maps(&mut self) {
        self.external_docs.sort_maps();
        self.extensions.sort();
    }
}

/// Validates every tag, then reports all tags sharing a name at once.
pub(crate) fn validate_tags(tags: &mut [Tag]) -> Result<(), PathError> {
    for (i, tag) in tags.iter_mut().enumerate() {
        tag.validate().at_index(i)?;
    }

    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(tags.len());
    let mut duplicates = Vec::new();
    for (i, tag) in tags.iter().enumerate() {
        if let Some(first) = seen.get(tag.name.as_str()) {
            if !duplicates.contains(first) {
                duplicates.push(*first);
            }
            duplicates.push(i);
        } else {
            seen.insert(&tag.name, i);
        }
    }
    duplicates.sort_unstable();

    let errors = duplicates.into_iter().map(|i| {
        PathError::invalid_str(&tags[i].name)
            .with_message("not unique")
            .field("name")
            .index(i)
    });
    match PathError::join(errors) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
