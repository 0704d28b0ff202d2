//! Structural traversal shared by the collection and resolution passes.
//!
//! A [`Location`] tracks where the walk currently is in two forms at once: the
//! canonical JSON pointer used as registry key, and the validator-style error path
//! used to annotate failures.

use crate::errpath::PathError;
use crate::oas::reference::RefOr;
use crate::ordmap::OrdMap;
use crate::resolver::registry::Component;
use std::hash::Hash;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Crumb {
    Field(String),
    Index(usize),
    Key(String),
}

#[derive(Debug, Clone)]
struct Segment {
    token: String,
    crumb: Crumb,
}

/// Current position of a walk.
#[derive(Debug, Clone, Default)]
pub struct Location {
    segments: Vec<Segment>,
}

impl Location {
    /// Canonical pointer (`#/paths/~1pets/get`), RFC 6901 escaped.
    pub fn pointer(&self) -> String {
        let mut out = String::from("#");
        for seg in &self.segments {
            out.push('/');
            out.push_str(&escape_token(&seg.token));
        }
        out
    }

    /// Wraps `err` with the error path of this location.
    pub fn wrap(&self, err: PathError) -> PathError {
        self.segments
            .iter()
            .rev()
            .fold(err, |err, seg| match &seg.crumb {
                Crumb::Field(name) => err.field(name.as_str()),
                Crumb::Index(i) => err.index(*i),
                Crumb::Key(k) => err.key(k.as_str()),
            })
    }

    fn with<R>(&mut self, segment: Segment, f: impl FnOnce(&mut Self) -> R) -> R {
        self.segments.push(segment);
        let out = f(self);
        self.segments.pop();
        out
    }

    /// Descends into a member rendered as `.name`.
    pub fn field<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with(
            Segment {
                token: name.to_string(),
                crumb: Crumb::Field(name.to_string()),
            },
            f,
        )
    }

    /// Descends into a member whose error path differs from its JSON name
    /// (operations: `get` is rendered `GET`).
    pub fn labeled<R>(&mut self, token: &str, label: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with(
            Segment {
                token: token.to_string(),
                crumb: Crumb::Field(label.to_string()),
            },
            f,
        )
    }

    /// Descends into a list item rendered as `[i]`.
    pub fn index<R>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with(
            Segment {
                token: index.to_string(),
                crumb: Crumb::Index(index),
            },
            f,
        )
    }

    /// Descends into a map entry rendered as `["key"]`.
    pub fn key<R>(&mut self, key: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with(
            Segment {
                token: key.to_string(),
                crumb: Crumb::Key(key.to_string()),
            },
            f,
        )
    }
}

/// Escapes a pointer token per RFC 6901.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Callback invoked at every reference cell reached by a walk.
pub(crate) trait Visitor {
    fn visit<T: Component>(&mut self, loc: &Location, cell: &mut RefOr<T>)
        -> Result<(), PathError>;
}

/// Types that can be walked for reference cells.
pub(crate) trait Walk {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, visitor: &mut V) -> Result<(), PathError>;
}

impl<T: Component> Walk for RefOr<T> {
    /// Inline values are descended into; references are not.
    fn walk<V: Visitor>(&mut self, loc: &mut Location, visitor: &mut V) -> Result<(), PathError> {
        visitor.visit(loc, self)?;
        if let RefOr::Value(rc) = self {
            let rc = Rc::clone(rc);
            let mut value = rc
                .try_borrow_mut()
                .map_err(|_| loc.wrap(PathError::message("value is borrowed elsewhere")))?;
            value.walk(loc, visitor)?;
        }
        Ok(())
    }
}

impl<T: Walk> Walk for Option<T> {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, visitor: &mut V) -> Result<(), PathError> {
        match self {
            Some(inner) => inner.walk(loc, visitor),
            None => Ok(()),
        }
    }
}

impl<T: Walk> Walk for Vec<T> {
    fn walk<V: Visitor>(&mut self, loc: &mut Location, visitor: &mut V) -> Result<(), PathError> {
        for (i, item) in self.iter_mut().enumerate() {
            loc.index(i, |loc| item.walk(loc, visitor))?;
        }
        Ok(())
    }
}

impl<K, T> Walk for OrdMap<K, T>
where
    K: Eq + Hash + Ord + AsRef<str>,
    T: Walk,
{
    fn walk<V: Visitor>(&mut self, loc: &mut Location, visitor: &mut V) -> Result<(), PathError> {
        for (key, value) in self.by_index_mut() {
            loc.key(key.as_ref(), |loc| value.walk(loc, visitor))?;
        }
        Ok(())
    }
}

/// Walks a map whose keys are rendered as fields in error paths (`links.MyLink`).
pub(crate) fn walk_named<T: Walk, V: Visitor>(
    map: &mut OrdMap<String, T>,
    loc: &mut Location,
    visitor: &mut V,
) -> Result<(), PathError> {
    for (key, value) in map.by_index_mut() {
        loc.field(key, |loc| value.walk(loc, visitor))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_and_error_path() {
        let mut loc = Location::default();
        let (pointer, err) = loc.field("paths", |loc| {
            loc.key("/pets/{id}", |loc| {
                loc.labeled("get", "GET", |loc| {
                    loc.field("parameters", |loc| {
                        loc.index(0, |loc| (loc.pointer(), loc.wrap(PathError::Required)))
                    })
                })
            })
        });
        assert_eq!(pointer, "#/paths/~1pets~1{id}/get/parameters/0");
        assert_eq!(
            err.to_string(),
            r#"paths["/pets/{id}"].GET.parameters[0] is required"#
        );
        assert_eq!(loc.pointer(), "#");
    }

    #[test]
    fn test_escape_token() {
        assert_eq!(escape_token("a~b/c"), "a~0b~1c");
    }
}
