//! Pass 2: bind every local `$ref` to the object collected under its pointer.

use crate::errpath::PathError;
use crate::oas::reference::RefOr;
use crate::resolver::registry::{Component, Registry};
use crate::resolver::walk::{Location, Visitor};
use std::rc::Rc;

pub(crate) struct Resolver<'r> {
    registry: &'r Registry,
    pub(crate) resolved: usize,
    pub(crate) external: usize,
}

impl<'r> Resolver<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            resolved: 0,
            external: 0,
        }
    }
}

impl Visitor for Resolver<'_> {
    fn visit<T: Component>(
        &mut self,
        loc: &Location,
        cell: &mut RefOr<T>,
    ) -> Result<(), PathError> {
        let RefOr::Ref { reference, target } = cell else {
            return Ok(());
        };
        if target.as_ref().is_some_and(|t| t.strong_count() > 0) {
            return Ok(());
        }
        if !reference.is_local() {
            log::debug!("leaving external reference {:?} unresolved", reference.identifier);
            self.external += 1;
            return Ok(());
        }

        match T::table(self.registry).get(&reference.identifier) {
            Some(value) => {
                log::trace!("{} -> {}", loc.pointer(), reference.identifier);
                *target = Some(Rc::downgrade(&value));
                self.resolved += 1;
                Ok(())
            }
            None => Err(loc.wrap(PathError::message(format!(
                "couldn't resolve {:?}",
                reference.identifier
            )))),
        }
    }
}
