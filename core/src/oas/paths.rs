//! # Paths and Operations
//!
//! Relative endpoint paths, the path items holding one operation per HTTP
//! method, and the callbacks an operation may trigger.

use crate::errpath::{PathError, PathResultExt};
use crate::oas::extensions::Extensions;
use crate::oas::info::ExternalDocs;
use crate::oas::parameter::ParameterList;
use crate::oas::reference::RefOr;
use crate::oas::request_body::RequestBodyRef;
use crate::oas::response::{validate_operation_responses, OperationResponses};
use crate::oas::security::{validate_security, SecurityRequirement};
use crate::oas::server::Server;
use crate::oas::sort::SortMaps;
use crate::oas::validation::{trim_opt, Validate};
use crate::ordmap::OrdMap;
use crate::resolver::walk::{Location, Visitor, Walk};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// A relative endpoint path such as `/pets/{petId}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(String);

/// A piece of a templated path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// Text matched literally.
    Literal(&'a str),
    /// A `{name}` template expression, without braces.
    Param(&'a str),
}

impl Path {
    /// Wraps a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the path into literal text and `{param}` expressions. An unclosed
    /// brace is kept as literal text.
    pub fn segments(&self) -> Vec<PathSegment<'_>> {
        let mut out = Vec::new();
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open..].find('}') else {
                break;
            };
            if open > 0 {
                out.push(PathSegment::Literal(&rest[..open]));
            }
            out.push(PathSegment::Param(&rest[open + 1..open + len]));
            rest = &rest[open + len + 1..];
        }
        if !rest.is_empty() {
            out.push(PathSegment::Literal(rest));
        }
        out
    }

    /// Names of the template parameters, in order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments().into_iter().filter_map(|seg| match seg {
            PathSegment::Param(name) => Some(name),
            PathSegment::Literal(_) => None,
        })
    }

    /// Must be non-empty and start with a slash.
    pub fn validate(&self) -> Result<(), PathError> {
        if self.0.is_empty() {
            return Err(PathError::message("path must not be empty"));
        }
        if !self.0.starts_with('/') {
            return Err(PathError::message("path must start with a /"));
        }
        Ok(())
    }
}

impl Borrow<str> for Path {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Endpoints keyed by relative path.
pub type Paths = OrdMap<Path, PathItem>;

/// A path item or a reference to one.
pub type PathItemRef = RefOr<PathItem>;

/// Named path items (`components.pathItems`, `webhooks`).
pub type PathItems = OrdMap<String, PathItemRef>;

/// Runtime expression keyed path items describing an out-of-band request.
pub type Callback = OrdMap<String, PathItemRef>;

/// A callback or a reference to one.
pub type CallbackRef = RefOr<Callback>;

/// Callbacks keyed by name.
pub type Callbacks = OrdMap<String, CallbackRef>;

/// The operations available on a single path.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// Summary for all operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Description for all operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// GET
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// TRACE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    /// Alternative servers for all operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// Parameters shared by all operations.
    #[serde(default, skip_serializing_if = "ParameterList::is_empty")]
    pub parameters: ParameterList,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// `(json member, error path label)` of every operation slot, in document order.
static METHODS: [(&str, &str); 8] = [
    ("get", "GET"),
    ("put", "PUT"),
    ("post", "POST"),
    ("delete", "DELETE"),
    ("options", "OPTIONS"),
    ("head", "HEAD"),
    ("patch", "PATCH"),
    ("trace", "TRACE"),
];

impl PathItem {
    fn slots(&self) -> [&Option<Operation>; 8] {
        [
            &self.get,
            &self.put,
            &self.post,
            &self.delete,
            &self.options,
            &self.head,
            &self.patch,
            &self.trace,
        ]
    }

    fn slots_mut(&mut self) -> [&mut Option<Operation>; 8] {
        [
            &mut self.get,
            &mut self.put,
            &mut self.post,
            &mut self.delete,
            &mut self.options,
            &mut self.head,
            &mut self.patch,
            &mut self.trace,
        ]
    }

    /// Defined operations with their upper case method name.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        METHODS
            .iter()
            .zip(self.slots())
            .filter_map(|((_, label), op)| op.as_ref().map(|op| (*label, op)))
    }

    fn operations_mut(
        &mut self,
    ) -> impl Iterator<Item = (&'static str, &'static str, &mut Operation)> {
        METHODS
            .iter()
            .zip(self.slots_mut())
            .filter_map(|((token, label), op)| op.as_mut().map(|op| (*token, *label, op)))
    }
}

impl Validate for PathItem {
    fn validate(&mut self) -> Result<(), PathError> {
        trim_opt(&mut self.description);

        self.parameters.validate().at_field("parameters")?;
        for (_, label, op) in self.operations_mut() {
            op.validate().at_field(label)?;
        }
        self.servers.validate().at_field("servers")?;

        self.extensions.validate()
    }
}

impl Walk for PathItem {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("parameters", |loc| self.parameters.walk(loc, v))?;
        for (token, label, op) in self.operations_mut() {
            loc.labeled(token, label, |loc| op.walk(loc, v))?;
        }
        Ok(())
    }
}

impl SortMaps for PathItem {
    fn sort_maps(&mut self) {
        self.parameters.sort_maps();
        for (_, _, op) in self.operations_mut() {
            op.sort_maps();
        }
        self.servers.sort_maps();
        self.extensions.sort();
    }
}

/// A single API operation on a path.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Tags for logical grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Verbose explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Additional documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    /// Unique identifier across all operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Operation specific parameters.
    #[serde(default, skip_serializing_if = "ParameterList::is_empty")]
    pub parameters: ParameterList,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyRef>,
    /// Possible responses keyed by status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<OperationResponses>,
    /// Out-of-band callbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<Callbacks>,
    /// Whether the operation is being phased out.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Security requirements overriding the document's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Alternative servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// `x-` members.
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Operation {
    /// The operation id, if set and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.operation_id.as_deref().filter(|id| !id.is_empty())
    }
}

impl Validate for Operation {
    fn validate(&mut self) -> Result<(), PathError> {
        trim_opt(&mut self.summary);
        trim_opt(&mut self.description);

        self.external_docs.validate().at_field("externalDocs")?;
        self.parameters.validate().at_field("parameters")?;
        self.request_body.validate().at_field("requestBody")?;
        if let Some(responses) = &mut self.responses {
            validate_operation_responses(responses).at_field("responses")?;
        }
        self.callbacks.validate().at_field("callbacks")?;
        if let Some(security) = &self.security {
            validate_security(security, None).at_field("security")?;
        }
        self.servers.validate().at_field("servers")?;

        self.extensions.validate()
    }
}

impl Walk for Operation {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, v: &mut V) -> Result<(), PathError> {
        loc.field("parameters", |loc| self.parameters.walk(loc, v))?;
        loc.field("requestBody", |loc| self.request_body.walk(loc, v))?;
        loc.field("responses", |loc| self.responses.walk(loc, v))?;
        loc.field("callbacks", |loc| self.callbacks.walk(loc, v))
    }
}

impl SortMaps for Operation {
    fn sort_maps(&mut self) {
        self.external_docs.sort_maps();
        self.parameters.sort_maps();
        self.request_body.sort_maps();
        self.responses.sort_maps();
        self.callbacks.sort_maps();
        self.security.sort_maps();
        self.servers.sort_maps();
        self.extensions.sort();
    }
}

fn not_unique(id: &str, path: impl FnOnce(PathError) -> PathError) -> PathError {
    path(
        PathError::invalid_str(id)
            .with_message("must be unique")
            .field("operationId"),
    )
}

/// Reports the first operation id that is used twice together with its first
/// occurrence.
fn check_unique_ids<'a>(
    ops: impl Iterator<Item = (&'a str, PathError)>,
) -> Result<(), PathError> {
    let mut seen: HashMap<&str, PathError> = HashMap::new();
    for (id, err) in ops {
        if let Some(previous) = seen.remove(id) {
            return Err(PathError::Join(vec![previous, err]));
        }
        seen.insert(id, err);
    }
    Ok(())
}

/// Validates every path and path item, then requires operation ids to be
/// unique across all paths.
pub(crate) fn validate_paths(paths: &mut Paths) -> Result<(), PathError> {
    for (path, item) in paths.by_index_mut() {
        path.validate().at_key(path.as_str())?;
        item.validate().at_key(path.as_str())?;
    }

    let ops = paths.by_index().flat_map(|(path, item)| {
        item.operations().filter_map(move |(label, op)| {
            let id = op.id()?;
            Some((id, not_unique(id, |e| e.field(label).key(path.as_str()))))
        })
    });
    check_unique_ids(ops)
}

/// Validates webhook path items, then requires operation ids to be unique
/// among webhooks. Referenced path items are validated where they are defined.
pub(crate) fn validate_webhooks(webhooks: &mut PathItems) -> Result<(), PathError> {
    webhooks.validate()?;

    let mut ids: Vec<(String, PathError)> = Vec::new();
    for (name, item) in webhooks.by_index() {
        item.with(|item| {
            for (label, op) in item.operations() {
                if let Some(id) = op.id() {
                    ids.push((id.to_string(), not_unique(id, |e| e.field(label).key(name))));
                }
            }
        });
    }
    check_unique_ids(ids.iter().map(|(id, err)| (id.as_str(), err.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_segments() {
        let path = Path::from("/pets/{petId}/photos/{photoId}.jpg");
        assert_eq!(
            path.segments(),
            [
                PathSegment::Literal("/pets/"),
                PathSegment::Param("petId"),
                PathSegment::Literal("/photos/"),
                PathSegment::Param("photoId"),
                PathSegment::Literal(".jpg"),
            ]
        );
        assert_eq!(path.params().collect::<Vec<_>>(), ["petId", "photoId"]);
        assert_eq!(
            Path::from("/a/{open").segments(),
            [PathSegment::Literal("/a/{open")]
        );
    }

    #[test]
    fn test_path_validation() {
        let mut paths: Paths = serde_json::from_value(json!({"pets": {}})).unwrap();
        assert_eq!(
            validate_paths(&mut paths).unwrap_err().to_string(),
            r#"["pets"]: path must start with a /"#
        );
    }

    #[test]
    fn test_operation_errors_use_method_labels() {
        let mut paths: Paths = serde_json::from_value(json!({
            "/": {"get": {"parameters": [{"in": "query"}]}}
        }))
        .unwrap();
        assert_eq!(
            validate_paths(&mut paths).unwrap_err().to_string(),
            r#"["/"].GET.parameters[0].name is required"#
        );
    }

    #[test]
    fn test_duplicate_operation_ids() {
        let mut paths: Paths = serde_json::from_value(json!({
            "/": {"get": {"operationId": "x"}},
            "/a": {"post": {"operationId": "y"}, "put": {"operationId": "x"}}
        }))
        .unwrap();
        assert_eq!(
            validate_paths(&mut paths).unwrap_err().to_string(),
            "[\"/\"].GET.operationId (\"x\") is invalid: must be unique\n\
             [\"/a\"].PUT.operationId (\"x\") is invalid: must be unique"
        );
    }

    #[test]
    fn test_webhook_ids_checked_separately() {
        let mut webhooks: PathItems = serde_json::from_value(json!({
            "newPet": {"post": {"operationId": "x"}},
            "oldPet": {"post": {"operationId": "x"}}
        }))
        .unwrap();
        assert_eq!(
            validate_webhooks(&mut webhooks).unwrap_err().to_string(),
            "[\"newPet\"].POST.operationId (\"x\") is invalid: must be unique\n\
             [\"oldPet\"].POST.operationId (\"x\") is invalid: must be unique"
        );
    }

    #[test]
    fn test_operation_children() {
        let mut op: Operation = serde_json::from_value(json!({
            "summary": " List pets ",
            "responses": {"200": {}}
        }))
        .unwrap();
        assert_eq!(
            op.validate().unwrap_err().to_string(),
            r#"responses["200"].description is required"#
        );
        assert_eq!(op.summary.as_deref(), Some("List pets"));

        let mut op: Operation = serde_json::from_value(json!({
            "requestBody": {"description": "x"}
        }))
        .unwrap();
        assert_eq!(
            op.validate().unwrap_err().to_string(),
            "requestBody.content is required"
        );

        let mut op: Operation = serde_json::from_value(json!({
            "callbacks": {"onData": {"{$request.query.url}": {"post": {"responses": {"204": {}}}}}}
        }))
        .unwrap();
        assert_eq!(
            op.validate().unwrap_err().to_string(),
            r#"callbacks["onData"]["{$request.query.url}"].POST.responses["204"].description is required"#
        );

        let mut op: Operation =
            serde_json::from_value(json!({"security": [{"": []}]})).unwrap();
        assert_eq!(
            op.validate().unwrap_err().to_string(),
            r#"security[0][""]: empty security scheme name"#
        );
    }

    #[test]
    fn test_path_item_order_of_operations() {
        let item: PathItem = serde_json::from_value(json!({
            "post": {}, "get": {}, "trace": {}
        }))
        .unwrap();
        let methods: Vec<&str> = item.operations().map(|(m, _)| m).collect();
        assert_eq!(methods, ["GET", "POST", "TRACE"]);
    }
}
