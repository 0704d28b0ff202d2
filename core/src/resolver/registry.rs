#![deny(missing_docs)]

//! # Component Registry
//!
//! Lookup tables filled by the collection pass: one table per referenceable kind,
//! keyed by canonical pointer. A reference cell found at a registered position is
//! recorded as an alias so that chained references resolve to the final target.

use crate::oas::reference::Shared;
use crate::oas::{
    Callback, Example, Header, Link, Parameter, PathItem, RequestBody, Response, Schema,
    SecurityScheme,
};
use crate::resolver::walk::Walk;
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// The ten kinds of reusable objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// `schemas`
    Schemas,
    /// `responses`
    Responses,
    /// `parameters`
    Parameters,
    /// `examples`
    Examples,
    /// `requestBodies`
    RequestBodies,
    /// `headers`
    Headers,
    /// `securitySchemes`
    SecuritySchemes,
    /// `links`
    Links,
    /// `callbacks`
    Callbacks,
    /// `pathItems`
    PathItems,
}

impl ComponentKind {
    /// Member name under `components`.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Schemas => "schemas",
            ComponentKind::Responses => "responses",
            ComponentKind::Parameters => "parameters",
            ComponentKind::Examples => "examples",
            ComponentKind::RequestBodies => "requestBodies",
            ComponentKind::Headers => "headers",
            ComponentKind::SecuritySchemes => "securitySchemes",
            ComponentKind::Links => "links",
            ComponentKind::Callbacks => "callbacks",
            ComponentKind::PathItems => "pathItems",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes a local `$ref` for lookup: the fragment is percent-decoded, pointer
/// escapes (`~0`, `~1`) are kept as written.
pub fn normalize_pointer(identifier: &str) -> String {
    percent_decode_str(identifier)
        .decode_utf8_lossy()
        .into_owned()
}

/// Registered objects of one kind.
#[derive(Debug)]
pub struct Table<T> {
    targets: IndexMap<String, Shared<T>>,
    aliases: IndexMap<String, String>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            targets: IndexMap::new(),
            aliases: IndexMap::new(),
        }
    }
}

impl<T> Table<T> {
    /// Registers `value` under `pointer`. Returns `true` when an earlier
    /// registration was replaced.
    pub(crate) fn register(&mut self, pointer: String, value: Shared<T>) -> bool {
        self.aliases.shift_remove(&pointer);
        self.targets.insert(pointer, value).is_some()
    }

    /// Records that `pointer` is itself a reference to `identifier`.
    pub(crate) fn alias(&mut self, pointer: String, identifier: &str) {
        self.aliases.insert(pointer, normalize_pointer(identifier));
    }

    /// Finds the object registered under `pointer`, following alias chains.
    /// Alias cycles yield `None`.
    pub fn get(&self, pointer: &str) -> Option<Shared<T>> {
        let mut current = normalize_pointer(pointer);
        let mut seen = HashSet::new();
        loop {
            if let Some(value) = self.targets.get(&current) {
                return Some(Rc::clone(value));
            }
            let next = self.aliases.get(&current)?.clone();
            if !seen.insert(current) {
                return None;
            }
            current = next;
        }
    }

    /// Number of registered objects (aliases excluded).
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Registered pointers in collection order.
    pub fn pointers(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }
}

/// All lookup tables of one document.
#[derive(Debug, Default)]
pub struct Registry {
    pub(crate) schemas: Table<Schema>,
    pub(crate) responses: Table<Response>,
    pub(crate) parameters: Table<Parameter>,
    pub(crate) examples: Table<Example>,
    pub(crate) request_bodies: Table<RequestBody>,
    pub(crate) headers: Table<Header>,
    pub(crate) security_schemes: Table<SecurityScheme>,
    pub(crate) links: Table<Link>,
    pub(crate) callbacks: Table<Callback>,
    pub(crate) path_items: Table<PathItem>,
}

/// Binds a model type to its table.
pub(crate) trait Component: Walk + Sized {
    const KIND: ComponentKind;
    fn table(registry: &Registry) -> &Table<Self>;
    fn table_mut(registry: &mut Registry) -> &mut Table<Self>;
}

macro_rules! component {
    ($ty:ty, $kind:ident, $field:ident, $getter:ident) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$kind;

            fn table(registry: &Registry) -> &Table<Self> {
                &registry.$field
            }

            fn table_mut(registry: &mut Registry) -> &mut Table<Self> {
                &mut registry.$field
            }
        }

        impl Registry {
            #[doc = concat!("Looks up a registered `", stringify!($ty), "` by pointer.")]
            pub fn $getter(&self, pointer: &str) -> Option<Shared<$ty>> {
                self.$field.get(pointer)
            }
        }
    };
}

component!(Schema, Schemas, schemas, schema);
component!(Response, Responses, responses, response);
component!(Parameter, Parameters, parameters, parameter);
component!(Example, Examples, examples, example);
component!(RequestBody, RequestBodies, request_bodies, request_body);
component!(Header, Headers, headers, header);
component!(SecurityScheme, SecuritySchemes, security_schemes, security_scheme);
component!(Link, Links, links, link);
component!(Callback, Callbacks, callbacks, callback);
component!(PathItem, PathItems, path_items, path_item);

impl Registry {
    /// Total number of registered objects across all kinds.
    pub fn len(&self) -> usize {
        self.schemas.len()
            + self.responses.len()
            + self.parameters.len()
            + self.examples.len()
            + self.request_bodies.len()
            + self.headers.len()
            + self.security_schemes.len()
            + self.links.len()
            + self.callbacks.len()
            + self.path_items.len()
    }

    /// Whether no object was registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The schema table, for inspection.
    pub fn schemas(&self) -> &Table<Schema> {
        &self.schemas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::reference::shared;

    #[test]
    fn test_alias_chain_and_cycle() {
        let mut table: Table<i32> = Table::default();
        let target = shared(7);
        table.register("#/components/schemas/C".into(), Rc::clone(&target));
        table.alias("#/components/schemas/B".into(), "#/components/schemas/C");
        table.alias("#/components/schemas/A".into(), "#/components/schemas/B");
        let found = table.get("#/components/schemas/A").unwrap();
        assert!(Rc::ptr_eq(&found, &target));

        table.alias("#/components/schemas/X".into(), "#/components/schemas/Y");
        table.alias("#/components/schemas/Y".into(), "#/components/schemas/X");
        assert!(table.get("#/components/schemas/X").is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_lookup_percent_decodes() {
        let mut table: Table<i32> = Table::default();
        table.register("#/paths/~1users~1{id}/get".into(), shared(1));
        assert!(table.get("#/paths/~1users~1%7Bid%7D/get").is_some());
    }

    #[test]
    fn test_register_reports_overwrite() {
        let mut table: Table<i32> = Table::default();
        assert!(!table.register("#/a".into(), shared(1)));
        assert!(table.register("#/a".into(), shared(2)));
        assert_eq!(table.get("#/a").map(|v| *v.borrow()), Some(2));
    }
}
