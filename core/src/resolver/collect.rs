//! Pass 1: register every inline referenceable object under its canonical pointer.

use crate::errpath::PathError;
use crate::oas::reference::RefOr;
use crate::resolver::registry::{Component, Registry};
use crate::resolver::walk::{Location, Visitor};
use std::rc::Rc;

pub(crate) struct Collector<'r> {
    registry: &'r mut Registry,
}

impl<'r> Collector<'r> {
    pub(crate) fn new(registry: &'r mut Registry) -> Self {
        Self { registry }
    }
}

impl Visitor for Collector<'_> {
    fn visit<T: Component>(
        &mut self,
        loc: &Location,
        cell: &mut RefOr<T>,
    ) -> Result<(), PathError> {
        let pointer = loc.pointer();
        match cell {
            RefOr::Value(rc) => {
                log::trace!("collected {} at {pointer}", T::KIND);
                if T::table_mut(self.registry).register(pointer.clone(), Rc::clone(rc)) {
                    log::warn!("{} at {pointer} registered twice, keeping the last one", T::KIND);
                }
            }
            RefOr::Ref { reference, .. } if reference.is_local() => {
                T::table_mut(self.registry).alias(pointer, &reference.identifier);
            }
            RefOr::Ref { .. } => {}
        }
        Ok(())
    }
}
