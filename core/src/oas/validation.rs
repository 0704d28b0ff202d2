#![deny(missing_docs)]

//! # OpenAPI Validation
//!
//! The [`Validate`] contract and the checks shared by many objects: component key
//! names, ordered map traversal with key wrapping, and the two normalizations
//! validators may apply (trimming descriptions, defaulting URL schemes to `https`).

use crate::errpath::{PathError, PathResultExt};
use crate::ordmap::OrdMap;
use regex::Regex;
use std::hash::Hash;
use std::sync::OnceLock;
use url::Url;

/// Pattern every `components` registry key must match.
pub const COMPONENT_KEY_PATTERN: &str = r"^[a-zA-Z0-9\.\-_]+$";

/// Structural validation of a document object.
///
/// Validation takes `&mut self` because it may trim description text and
/// default URL schemes. Everything else is read-only.
pub trait Validate {
    /// Checks the object and its children, returning a path-qualified error.
    fn validate(&mut self) -> Result<(), PathError>;
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&mut self) -> Result<(), PathError> {
        match self {
            Some(value) => value.validate(),
            None => Ok(()),
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&mut self) -> Result<(), PathError> {
        for (i, item) in self.iter_mut().enumerate() {
            item.validate().at_index(i)?;
        }
        Ok(())
    }
}

impl<K, V> Validate for OrdMap<K, V>
where
    K: Eq + Hash + Ord + AsRef<str>,
    V: Validate,
{
    fn validate(&mut self) -> Result<(), PathError> {
        for (key, value) in self.by_index_mut() {
            value.validate().at_key(key.as_ref())?;
        }
        Ok(())
    }
}

fn component_key_re() -> &'static Regex {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    KEY_RE.get_or_init(|| Regex::new(COMPONENT_KEY_PATTERN).expect("Invalid regex constant"))
}

/// Checks a registry key against [`COMPONENT_KEY_PATTERN`].
pub fn validate_key(key: &str) -> Result<(), PathError> {
    if component_key_re().is_match(key) {
        return Ok(());
    }
    Err(PathError::invalid_str(key).with_message(format!(
        "must match the regular expression {COMPONENT_KEY_PATTERN:?}"
    )))
}

/// Validates a named registry: every key must be a valid component name
/// and every value must validate.
pub fn validate_keyed_map<V: Validate>(map: &mut OrdMap<String, V>) -> Result<(), PathError> {
    for (key, value) in map.by_index_mut() {
        validate_key(key).at_key(key)?;
        value.validate().at_key(key)?;
    }
    Ok(())
}

/// Trims leading and trailing whitespace in place.
pub fn trim(text: &mut String) {
    let trimmed = text.trim();
    if trimmed.len() != text.len() {
        *text = trimmed.to_string();
    }
}

/// Trims an optional description in place.
pub fn trim_opt(text: &mut Option<String>) {
    if let Some(text) = text {
        trim(text);
    }
}

/// Defaults a scheme-less URL to `https`. Empty strings are left alone.
pub fn fix_scheme(raw: &mut String) {
    if raw.is_empty() || Url::parse(raw).is_ok() {
        return;
    }
    *raw = match raw.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => format!("https://{raw}"),
    };
}

/// Fails with `Invalid` when the text is not an absolute URL.
pub fn validate_url(raw: &str) -> Result<(), PathError> {
    Url::parse(raw)
        .map(|_| ())
        .map_err(|e| PathError::invalid_str(raw).with_message(e.to_string()))
}

/// `Required` when `text` is empty.
pub fn require(text: &str) -> Result<(), PathError> {
    if text.is_empty() {
        Err(PathError::Required)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("Pet.v1-beta_2").is_ok());
        assert_eq!(
            validate_key(" ").unwrap_err().key(" ").to_string(),
            r#"[" "] (" ") is invalid: must match the regular expression "^[a-zA-Z0-9\\.\\-_]+$""#
        );
    }

    #[test]
    fn test_fix_scheme() {
        let mut url = "example.com/terms".to_string();
        fix_scheme(&mut url);
        assert_eq!(url, "https://example.com/terms");

        let mut url = "//cdn.example.com".to_string();
        fix_scheme(&mut url);
        assert_eq!(url, "https://cdn.example.com");

        let mut url = "http://example.com".to_string();
        fix_scheme(&mut url);
        assert_eq!(url, "http://example.com");
    }

    #[test]
    fn test_trim() {
        let mut text = "  spaced \n".to_string();
        trim(&mut text);
        assert_eq!(text, "spaced");
        let mut none: Option<String> = None;
        trim_opt(&mut none);
        assert_eq!(none, None);
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn test_vec_validation_wraps_index() {
        struct AlwaysRequired;
        impl Validate for AlwaysRequired {
            fn validate(&mut self) -> Result<(), PathError> {
                Err(PathError::Required.field("url"))
            }
        }
        let mut list = vec![AlwaysRequired];
        assert_eq!(list.validate().unwrap_err().to_string(), "[0].url is required");
    }
}
