#![deny(missing_docs)]

//! # OASDoc Core
//!
//! An OpenAPI 3.0/3.1 document model that decodes JSON or YAML, binds local
//! `$ref`s to their targets, validates the result with path-qualified errors
//! and writes it back without reordering anything.
//!
//! ```no_run
//! use oasdoc_core::{load_from_file, CodecOptions, Validate};
//!
//! let mut doc = load_from_file("openapi.yaml")?;
//! doc.validate()?;
//! doc.write_to_file("out/openapi.json", &CodecOptions::default())?;
//! # Ok::<(), oasdoc_core::AppError>(())
//! ```

/// Shared error types.
pub mod error;

/// Path-qualified validation errors.
pub mod errpath;

/// Insertion-ordered maps.
pub mod ordmap;

/// The OpenAPI object model and its validators.
pub mod oas;

/// Two-pass `$ref` resolution.
pub mod resolver;

/// JSON/YAML loading and JSON saving.
pub mod codec;

pub use codec::{
    load_from_data, load_from_data_with_registry, load_from_file, load_from_file_with_registry,
    load_from_json, load_from_json_with_registry, load_from_reader,
    load_from_reader_with_registry, load_from_yaml, load_from_yaml_with_registry, CodecOptions,
    Format,
};
pub use error::{AppError, AppResult};
pub use errpath::{PathError, PathResultExt};
pub use oas::{Document, SortMaps, Validate};
pub use ordmap::OrdMap;
pub use resolver::registry::{ComponentKind, Registry};
pub use resolver::resolve_document;
