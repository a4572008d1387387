use std::rc::Rc;

use crate::prelude::DocumentTraits;

/// One immutable historical value of a document, plus the name of the edit
/// that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<D: DocumentTraits> {
    pub document: Rc<D>,
    pub action: &'static str,
}

impl<D: DocumentTraits> Snapshot<D> {
    pub fn new(document: D, action: &'static str) -> Self {
        Self {
            document: Rc::new(document),
            action,
        }
    }

    pub fn from_rc(document: Rc<D>, action: &'static str) -> Self {
        Self { document, action }
    }

    pub fn document(&self) -> &D {
        &self.document
    }
}
