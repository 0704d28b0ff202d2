#![deny(missing_docs)]

//! # Error Path Chain
//!
//! Validation errors are built bottom-up: the innermost check returns a terminal
//! error (`Required`, `Invalid` or a plain message) and every enclosing object wraps
//! it with the field, list index or map key it descended through. Rendering walks
//! the chain outward-in and produces a single locator string such as
//! `paths["/"].GET.parameters[0].name is required`.
//!
//! Independent failures are aggregated with [`PathError::join`]; each member is
//! rendered on its own line with the full enclosing path.

use std::fmt;

/// A terminal "value present but wrong" error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invalid {
    /// Pre-rendered offending value (`"foo"`, `true`, `4`). `None` omits it.
    pub value: Option<String>,
    /// Pre-rendered allowed values, printed as `must be one of: ...`.
    pub allowed: Vec<String>,
    /// Free text explaining the constraint. Takes precedence over `allowed`.
    pub message: Option<String>,
}

/// A validation error annotated with its location inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A required value is missing.
    Required,
    /// A value is present but violates a constraint.
    Invalid(Invalid),
    /// The inner error occurred inside the named field.
    Field {
        /// JSON member name, or display name for HTTP methods (`GET`).
        name: String,
        /// Wrapped error.
        source: Box<PathError>,
    },
    /// The inner error occurred at a list position.
    Index {
        /// Zero-based position.
        index: usize,
        /// Wrapped error.
        source: Box<PathError>,
    },
    /// The inner error occurred under a map key.
    Key {
        /// Map key, rendered quoted.
        key: String,
        /// Wrapped error.
        source: Box<PathError>,
    },
    /// Terminal free-form message.
    Message(String),
    /// Several independent errors sharing the enclosing path.
    Join(Vec<PathError>),
}

impl PathError {
    /// Terminal message error.
    pub fn message(msg: impl Into<String>) -> Self {
        PathError::Message(msg.into())
    }

    /// Invalid error that does not print the offending value.
    pub fn invalid() -> Self {
        PathError::Invalid(Invalid::default())
    }

    /// Invalid string value. Empty strings are not printed.
    pub fn invalid_str(value: &str) -> Self {
        PathError::Invalid(Invalid {
            value: (!value.is_empty()).then(|| format!("{value:?}")),
            ..Invalid::default()
        })
    }

    /// Invalid boolean value. Booleans are always printed.
    pub fn invalid_bool(value: bool) -> Self {
        PathError::Invalid(Invalid {
            value: Some(value.to_string()),
            ..Invalid::default()
        })
    }

    /// Invalid value printed with its `Display` form (numbers).
    pub fn invalid_display(value: impl fmt::Display) -> Self {
        PathError::Invalid(Invalid {
            value: Some(value.to_string()),
            ..Invalid::default()
        })
    }

    /// Attaches an explanation to an `Invalid` error. Other kinds are returned as is.
    pub fn with_message(self, msg: impl Into<String>) -> Self {
        match self {
            PathError::Invalid(mut inv) => {
                inv.message = Some(msg.into());
                PathError::Invalid(inv)
            }
            other => other,
        }
    }

    /// Attaches the allowed values to an `Invalid` error.
    pub fn with_allowed<I, S>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self {
            PathError::Invalid(mut inv) => {
                inv.allowed = allowed
                    .into_iter()
                    .map(|s| format!("{:?}", s.as_ref()))
                    .collect();
                PathError::Invalid(inv)
            }
            other => other,
        }
    }

    /// Wraps `self` as occurring inside field `name`.
    pub fn field(self, name: impl Into<String>) -> Self {
        PathError::Field {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Wraps `self` as occurring at list position `index`.
    pub fn index(self, index: usize) -> Self {
        PathError::Index {
            index,
            source: Box::new(self),
        }
    }

    /// Wraps `self` as occurring under map key `key`.
    pub fn key(self, key: impl Into<String>) -> Self {
        PathError::Key {
            key: key.into(),
            source: Box::new(self),
        }
    }

    /// Aggregates errors in encounter order. Returns `None` for an empty input and
    /// the error itself when there is only one.
    pub fn join(errors: impl IntoIterator<Item = PathError>) -> Option<Self> {
        let mut errors: Vec<PathError> = errors.into_iter().collect();
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(PathError::Join(errors)),
        }
    }

    /// Renders every aggregated error as its own fully-qualified line.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.write_lines(String::new(), &mut out);
        out
    }

    /// The terminal error at the end of a single chain.
    /// A `Join` is its own root.
    pub fn root(&self) -> &PathError {
        match self {
            PathError::Field { source, .. }
            | PathError::Index { source, .. }
            | PathError::Key { source, .. } => source.root(),
            other => other,
        }
    }

    fn write_lines(&self, path: String, out: &mut Vec<String>) {
        match self {
            PathError::Required => out.push(if path.is_empty() {
                "a value is required".to_string()
            } else {
                format!("{path} is required")
            }),
            PathError::Invalid(inv) => {
                let mut line = if path.is_empty() {
                    "a value".to_string()
                } else {
                    path
                };
                if let Some(value) = &inv.value {
                    line.push_str(" (");
                    line.push_str(value);
                    line.push(')');
                }
                line.push_str(" is invalid");
                if let Some(msg) = &inv.message {
                    line.push_str(": ");
                    line.push_str(msg);
                } else if !inv.allowed.is_empty() {
                    line.push_str(", must be one of: ");
                    line.push_str(&inv.allowed.join(", "));
                }
                out.push(line);
            }
            PathError::Field { name, source } => {
                let next = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{path}.{name}")
                };
                source.write_lines(next, out);
            }
            PathError::Index { index, source } => {
                source.write_lines(format!("{path}[{index}]"), out);
            }
            PathError::Key { key, source } => {
                source.write_lines(format!("{path}[{key:?}]"), out);
            }
            PathError::Message(msg) => out.push(if path.is_empty() {
                msg.clone()
            } else {
                format!("{path}: {msg}")
            }),
            PathError::Join(errors) => {
                for err in errors {
                    err.write_lines(path.clone(), out);
                }
            }
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

impl std::error::Error for PathError {}

/// Path wrapping for `Result`s so child validation reads as
/// `self.info.validate().at_field("info")?`.
pub trait PathResultExt<T> {
    /// Wraps the error as occurring inside field `name`.
    fn at_field(self, name: &str) -> Result<T, PathError>;
    /// Wraps the error as occurring at list position `index`.
    fn at_index(self, index: usize) -> Result<T, PathError>;
    /// Wraps the error as occurring under map key `key`.
    fn at_key(self, key: &str) -> Result<T, PathError>;
}

impl<T> PathResultExt<T> for Result<T, PathError> {
    fn at_field(self, name: &str) -> Result<T, PathError> {
        self.map_err(|e| e.field(name))
    }

    fn at_index(self, index: usize) -> Result<T, PathError> {
        self.map_err(|e| e.index(index))
    }

    fn at_key(self, key: &str) -> Result<T, PathError> {
        self.map_err(|e| e.key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rendering() {
        assert_eq!(PathError::Required.to_string(), "a value is required");
        assert_eq!(
            PathError::Required.field("name").to_string(),
            "name is required"
        );
        assert_eq!(
            PathError::Required
                .field("name")
                .index(0)
                .field("parameters")
                .field("GET")
                .key("/")
                .field("paths")
                .to_string(),
            r#"paths["/"].GET.parameters[0].name is required"#
        );
    }

    #[test]
    fn test_invalid_rendering() {
        let err = PathError::invalid_str("foo")
            .with_allowed(["path", "query", "header", "cookie"])
            .field("in");
        assert_eq!(
            err.to_string(),
            r#"in ("foo") is invalid, must be one of: "path", "query", "header", "cookie""#
        );

        let err = PathError::invalid_bool(false)
            .with_message("must be true for path parameters")
            .field("required");
        assert_eq!(
            err.to_string(),
            "required (false) is invalid: must be true for path parameters"
        );

        let err = PathError::invalid_str("").with_message("bad").field("x");
        assert_eq!(err.to_string(), "x is invalid: bad");

        assert_eq!(
            PathError::invalid_display(5.3).to_string(),
            "a value (5.3) is invalid"
        );
        assert_eq!(
            PathError::invalid_display(4.0).to_string(),
            "a value (4) is invalid"
        );
    }

    #[test]
    fn test_message_and_key_quoting() {
        let err = PathError::message("unknown field").key("a\"b").field("x");
        assert_eq!(err.to_string(), r#"x["a\"b"]: unknown field"#);
        assert_eq!(PathError::message("plain").to_string(), "plain");
    }

    #[test]
    fn test_join_distributes_path() {
        let dup = |i: usize| {
            PathError::invalid_str("corge")
                .with_message("duplicate name")
                .field("name")
                .index(i)
        };
        let err = PathError::join([dup(3), dup(5)])
            .expect("two errors")
            .key("bar")
            .field("foo");
        assert_eq!(
            err.to_string(),
            "foo[\"bar\"][3].name (\"corge\") is invalid: duplicate name\n\
             foo[\"bar\"][5].name (\"corge\") is invalid: duplicate name"
        );
        assert_eq!(err.lines().len(), 2);
    }

    #[test]
    fn test_join_small_inputs() {
        assert_eq!(PathError::join([]), None);
        assert_eq!(
            PathError::join([PathError::Required]),
            Some(PathError::Required)
        );
    }

    #[test]
    fn test_result_ext_and_root() {
        let res: Result<(), PathError> = Err(PathError::Required);
        let err = res.at_field("title").at_field("info").unwrap_err();
        assert_eq!(err.to_string(), "info.title is required");
        assert_eq!(err.root(), &PathError::Required);
    }
}
