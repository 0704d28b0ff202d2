#![deny(missing_docs)]

//! # OpenAPI Document Model
//!
//! - **document**: the root object and its whole-tree checks.
//! - **components**: registries of reusable objects.
//! - **paths**: endpoints, operations and callbacks.
//! - **reference**: the `$ref`-or-inline cell shared by every reusable kind.
//! - **validation**: the `Validate` contract and shared checks.
//! - **sort**: canonical key ordering of every map.

pub mod components;
pub mod document;
pub mod enums;
pub mod example;
pub mod extensions;
pub mod header;
pub mod info;
pub mod link;
pub mod media;
pub mod parameter;
pub mod paths;
pub mod reference;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod sort;
pub mod validation;

pub use components::Components;
pub use document::{Document, DIALECT_BASE, ERR_EMPTY_DOCUMENT};
pub use enums::{
    DataType, Format, ParameterLocation, ParameterStyle, SecuritySchemeIn, SecuritySchemeType,
};
pub use example::{Example, ExampleRef, Examples};
pub use extensions::{Extensions, ERR_UNKNOWN_FIELD};
pub use header::{Header, HeaderRef, Headers};
pub use info::{Contact, ExternalDocs, Info, License, Tag};
pub use link::{Link, LinkParameters, LinkRef, Links};
pub use media::{Content, Encoding, Encodings, MediaRange, MediaType};
pub use parameter::{Parameter, ParameterList, ParameterRef, Parameters};
pub use paths::{
    Callback, CallbackRef, Callbacks, Operation, Path, PathItem, PathItemRef, PathItems,
    PathSegment, Paths,
};
pub use reference::{shared, RefOr, RefState, Reference, Shared};
pub use request_body::{RequestBodies, RequestBody, RequestBodyRef};
pub use response::{OperationResponses, Response, ResponseRef, Responses, StatusCode};
pub use schema::{AdditionalProperties, Schema, SchemaRef, SchemaRefs};
pub use security::{
    OAuthFlow, OAuthFlows, Scopes, SecurityRequirement, SecurityScheme, SecuritySchemeRef,
    SecuritySchemes,
};
pub use server::{Server, ServerVariable, ServerVariables};
pub use sort::SortMaps;
pub use validation::{Validate, COMPONENT_KEY_PATTERN};
