#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Binds every local `$ref` of a decoded document to the object it names, in two
//! passes over the same tree:
//!
//! 1. **collect**: register every inline referenceable value under its canonical
//!    pointer, and record references found at such positions as aliases.
//! 2. **resolve**: look every local reference up in the table of its kind.
//!
//! Collection finishes before resolution starts, so forward references work. A
//! reference that cannot be bound aborts with the referencing site's path.

pub(crate) mod collect;
pub mod registry;
pub(crate) mod resolve;
pub mod walk;

use crate::errpath::PathError;
use crate::oas::Document;
use collect::Collector;
use registry::Registry;
use resolve::Resolver;
use walk::{Location, Walk};

/// Resolves all local references of `doc` in place and returns the registry
/// built along the way. External references are left unresolved.
pub fn resolve_document(doc: &mut Document) -> Result<Registry, PathError> {
    let mut registry = Registry::default();
    doc.walk(&mut Location::default(), &mut Collector::new(&mut registry))?;
    log::debug!("collected {} referenceable objects", registry.len());

    let mut resolver = Resolver::new(&registry);
    doc.walk(&mut Location::default(), &mut resolver)?;
    log::debug!(
        "resolved {} references, skipped {} external",
        resolver.resolved,
        resolver.external
    );

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::{RefOr, RefState, Schema};
    use serde_json::{json, Value};
    use std::rc::Rc;

    fn doc(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    fn resolve_err(value: Value) -> String {
        resolve_document(&mut doc(value)).unwrap_err().to_string()
    }

    fn schema_ref(schema: &Schema, index: usize) -> &RefOr<Schema> {
        &schema.all_of[index]
    }

    #[test]
    fn test_reference_aliases_component() {
        let mut d = doc(json!({"components": {"schemas": {
            "Pet": {"allOf": [{"$ref": "#/components/schemas/Dog"}]},
            "Dog": {"type": "object"}
        }}}));
        let registry = resolve_document(&mut d).unwrap();

        let schemas = &d.components.as_ref().unwrap().schemas;
        let dog = schemas.get("Dog").and_then(RefOr::value).unwrap();
        let pet = schemas.get("Pet").and_then(RefOr::value).unwrap();
        let pet = pet.borrow();
        let cell = schema_ref(&pet, 0);
        assert_eq!(cell.state(), RefState::Resolved);
        assert!(cell.ptr_eq(&dog));

        let registered = registry.schema("#/components/schemas/Dog").unwrap();
        assert!(Rc::ptr_eq(&registered, &dog));
    }

    #[test]
    fn test_forward_reference_from_paths() {
        let mut d = doc(json!({
            "paths": {"/": {"get": {"parameters": [{"$ref": "#/components/parameters/limit"}]}}},
            "components": {"parameters": {"limit": {"name": "limit", "in": "query", "schema": {"type": "integer"}}}}
        }));
        let registry = resolve_document(&mut d).unwrap();
        assert!(registry.parameter("#/paths/~1/get/parameters/0").is_some());

        let paths = d.paths.as_ref().unwrap();
        let get = paths.get("/").and_then(|item| item.get.as_ref()).unwrap();
        let name = get.parameters.iter().next().and_then(|p| p.with(|p| p.name.clone()));
        assert_eq!(name.as_deref(), Some("limit"));
    }

    #[test]
    fn test_dangling_reference_reports_site() {
        assert_eq!(
            resolve_err(json!({"paths": {"/": {
                "get": {"parameters": [{"$ref": "#/components/parameters/myparam"}]}
            }}})),
            r##"paths["/"].GET.parameters[0]: couldn't resolve "#/components/parameters/myparam""##
        );
        assert_eq!(
            resolve_err(json!({"components": {"schemas": {
                "Pet": {"allOf": [{"$ref": "#/components/schemas/Ghost"}]}
            }}})),
            r##"components.schemas["Pet"].allOf[0]: couldn't resolve "#/components/schemas/Ghost""##
        );
        assert_eq!(
            resolve_err(json!({"components": {"links": {
                "MyLink": {"$ref": "#/components/links/MyActualLink"}
            }}})),
            r##"components.links.MyLink: couldn't resolve "#/components/links/MyActualLink""##
        );
        assert_eq!(
            resolve_err(json!({"components": {"callbacks": {"MyCallback": {
                "$request.body#/url": {"$ref": "#/components/pathItems/MyPathItem"}
            }}}})),
            r##"components.callbacks["MyCallback"]["$request.body#/url"]: couldn't resolve "#/components/pathItems/MyPathItem""##
        );
    }

    #[test]
    fn test_alias_chain_and_cycle() {
        let mut d = doc(json!({"components": {"schemas": {
            "A": {"$ref": "#/components/schemas/B"},
            "B": {"$ref": "#/components/schemas/C"},
            "C": {"type": "string"},
            "User": {"type": "object", "properties": {"id": {"$ref": "#/components/schemas/A"}}}
        }}}));
        resolve_document(&mut d).unwrap();
        let schemas = &d.components.as_ref().unwrap().schemas;
        let c = schemas.get("C").and_then(RefOr::value).unwrap();
        assert!(schemas.get("A").unwrap().ptr_eq(&c));

        let err = resolve_err(json!({"components": {"schemas": {
            "X": {"$ref": "#/components/schemas/Y"},
            "Y": {"$ref": "#/components/schemas/X"}
        }}}));
        assert_eq!(
            err,
            r##"components.schemas["X"]: couldn't resolve "#/components/schemas/Y""##
        );
    }

    #[test]
    fn test_self_reference_and_external() {
        let mut d = doc(json!({"components": {"schemas": {
            "Node": {"type": "object", "properties": {
                "next": {"$ref": "#/components/schemas/Node"},
                "remote": {"$ref": "other.yaml#/components/schemas/Remote"}
            }}
        }}}));
        resolve_document(&mut d).unwrap();

        let node = d.components.as_ref().unwrap().schemas.get("Node").and_then(RefOr::value).unwrap();
        let inner = node.borrow();
        let props = inner.properties.as_ref().unwrap();
        assert!(props.get("next").unwrap().ptr_eq(&node));
        assert_eq!(props.get("remote").unwrap().state(), RefState::Unresolved);
        drop(inner);
        assert_eq!(Rc::strong_count(&node), 2);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut d = doc(json!({
            "paths": {"/": {"parameters": [{"$ref": "#/components/parameters/p"}]}},
            "components": {"parameters": {"p": {"name": "p", "in": "query", "schema": {"type": "string"}}}}
        }));
        resolve_document(&mut d).unwrap();
        let before = serde_json::to_value(&d).unwrap();
        resolve_document(&mut d).unwrap();
        assert_eq!(serde_json::to_value(&d).unwrap(), before);
    }
}
