#![deny(missing_docs)]

//! # Reference Cells
//!
//! Every reusable OpenAPI object appears either inline or as a `$ref`. [`RefOr`]
//! holds one of the two. Inline values live behind `Rc<RefCell<_>>` so a resolved
//! reference can alias the exact instance stored elsewhere in the document. The
//! alias is kept as a `Weak` pointer: recursive schemas never form strong cycles.

use crate::errpath::PathError;
use crate::oas::validation::Validate;
use serde::de::{DeserializeOwned, Error as DeError};
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Shared, interior-mutable handle used for every referenceable object.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps a value into a fresh [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// The `$ref` object itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    /// Pointer to the target, e.g. `#/components/schemas/Pet`.
    #[serde(rename = "$ref")]
    pub identifier: String,
    /// Overrides the target's summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Overrides the target's description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Reference {
    /// A reference with no summary or description.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            summary: None,
            description: None,
        }
    }

    /// Whether the reference points into the same document.
    pub fn is_local(&self) -> bool {
        self.identifier.starts_with('#')
    }
}

/// Observable state of a [`RefOr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefState {
    /// `$ref` present, target not bound (or no longer alive).
    Unresolved,
    /// `$ref` present and bound to a live target.
    Resolved,
    /// Inline value.
    Inline,
}

/// Either a `$ref` or an inline value.
#[derive(Debug)]
pub enum RefOr<T> {
    /// A reference, bound to its target after resolution.
    Ref {
        /// The `$ref` object, kept for serialization.
        reference: Reference,
        /// Target bound during resolution.
        target: Option<Weak<RefCell<T>>>,
    },
    /// An inline value.
    Value(Shared<T>),
}

impl<T> RefOr<T> {
    /// An inline cell.
    pub fn new(value: T) -> Self {
        RefOr::Value(shared(value))
    }

    /// An unresolved reference cell.
    pub fn from_ref(identifier: impl Into<String>) -> Self {
        RefOr::Ref {
            reference: Reference::new(identifier),
            target: None,
        }
    }

    /// The `$ref` object, if this is a reference.
    pub fn reference(&self) -> Option<&Reference> {
        match self {
            RefOr::Ref { reference, .. } => Some(reference),
            RefOr::Value(_) => None,
        }
    }

    /// Current state of the cell.
    pub fn state(&self) -> RefState {
        match self {
            RefOr::Value(_) => RefState::Inline,
            RefOr::Ref { target, .. } => match target.as_ref().and_then(Weak::upgrade) {
                Some(_) => RefState::Resolved,
                None => RefState::Unresolved,
            },
        }
    }

    /// The inline handle, if the cell is inline.
    pub fn inline(&self) -> Option<&Shared<T>> {
        match self {
            RefOr::Value(rc) => Some(rc),
            RefOr::Ref { .. } => None,
        }
    }

    /// The value behind the cell: the inline handle or the resolved target.
    pub fn value(&self) -> Option<Shared<T>> {
        match self {
            RefOr::Value(rc) => Some(Rc::clone(rc)),
            RefOr::Ref { target, .. } => target.as_ref().and_then(Weak::upgrade),
        }
    }

    /// Runs `f` on the value behind the cell. Returns `None` when the cell is
    /// unresolved or the value is mutably borrowed elsewhere.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let rc = self.value()?;
        let value = rc.try_borrow().ok()?;
        Some(f(&value))
    }

    /// Binds a reference cell to `target`. Inline cells are left unchanged.
    pub fn resolve_to(&mut self, value: &Shared<T>) {
        if let RefOr::Ref { target, .. } = self {
            *target = Some(Rc::downgrade(value));
        }
    }

    /// Whether the cell currently points at `other` (identity, not equality).
    pub fn ptr_eq(&self, other: &Shared<T>) -> bool {
        self.value().is_some_and(|rc| Rc::ptr_eq(&rc, other))
    }
}

impl<T> From<T> for RefOr<T> {
    fn from(value: T) -> Self {
        RefOr::new(value)
    }
}

impl<T: Default> Default for RefOr<T> {
    fn default() -> Self {
        RefOr::new(T::default())
    }
}

impl<T: PartialEq> PartialEq for RefOr<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RefOr::Ref { reference: a, .. }, RefOr::Ref { reference: b, .. }) => a == b,
            (RefOr::Value(a), RefOr::Value(b)) => {
                Rc::ptr_eq(a, b)
                    || matches!((a.try_borrow(), b.try_borrow()), (Ok(a), Ok(b)) if *a == *b)
            }
            _ => false,
        }
    }
}

impl<T: Validate> Validate for RefOr<T> {
    /// References are validated where their target is defined.
    fn validate(&mut self) -> Result<(), PathError> {
        match self {
            RefOr::Ref { .. } => Ok(()),
            RefOr::Value(rc) => rc
                .try_borrow_mut()
                .map_err(|_| PathError::message("value is borrowed elsewhere"))?
                .validate(),
        }
    }
}

impl<T: Serialize> Serialize for RefOr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RefOr::Ref { reference, .. } => reference.serialize(serializer),
            RefOr::Value(rc) => rc
                .try_borrow()
                .map_err(|_| S::Error::custom("value is borrowed elsewhere"))?
                .serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for RefOr<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        if raw.as_object().is_some_and(|obj| obj.contains_key("$ref")) {
            let reference = Reference::deserialize(raw).map_err(D::Error::custom)?;
            return Ok(RefOr::Ref {
                reference,
                target: None,
            });
        }
        T::deserialize(raw)
            .map(RefOr::new)
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Thing {
        name: String,
    }

    #[test]
    fn test_decode_reference_and_inline() {
        let cell: RefOr<Thing> =
            serde_json::from_str(r##"{"$ref": "#/components/things/a"}"##).unwrap();
        assert_eq!(cell.state(), RefState::Unresolved);
        assert_eq!(
            cell.reference().map(|r| r.identifier.as_str()),
            Some("#/components/things/a")
        );

        let cell: RefOr<Thing> = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(cell.state(), RefState::Inline);
        assert_eq!(cell.with(|t| t.name.clone()), Some("x".to_string()));
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        assert!(serde_json::from_str::<RefOr<Thing>>("null").is_err());
        assert!(serde_json::from_str::<RefOr<Thing>>(r##"{"$ref": "#/a", "x": 1}"##).is_err());
        assert!(serde_json::from_str::<RefOr<Thing>>(r#"{"other": 1}"#).is_err());
    }

    #[test]
    fn test_resolution_aliases_target() {
        let target = shared(Thing { name: "dog".into() });
        let mut cell: RefOr<Thing> = RefOr::from_ref("#/components/things/dog");
        cell.resolve_to(&target);
        assert_eq!(cell.state(), RefState::Resolved);
        assert!(cell.ptr_eq(&target));

        target.borrow_mut().name = "wolf".into();
        assert_eq!(cell.with(|t| t.name.clone()), Some("wolf".to_string()));

        drop(target);
        assert_eq!(cell.state(), RefState::Unresolved);
    }

    #[test]
    fn test_resolved_cell_serializes_as_reference() {
        let target = shared(Thing { name: "dog".into() });
        let mut cell: RefOr<Thing> = RefOr::from_ref("#/components/things/dog");
        cell.resolve_to(&target);
        assert_eq!(
            serde_json::to_string(&cell).unwrap(),
            r##"{"$ref":"#/components/things/dog"}"##
        );
        assert_eq!(
            serde_json::to_string(&RefOr::new(Thing { name: "x".into() })).unwrap(),
            r#"{"name":"x"}"#
        );
    }
}
