use std::rc::Rc;

use im::Vector;
use tracing::{debug, warn};

use crate::prelude::{DocumentTraits, EditorError};

use super::history_store::DEFAULT_MAX_DEPTH;

pub trait Invertible: Clone + core::fmt::Debug {
    fn invert(&self) -> Self;
}

/// An edit that can be replayed against a document of type `D`.
pub trait Reversible<D>: Invertible {
    fn apply(&self, document: &D) -> Result<D, EditorError>;
}

/// Undo/redo stacks of invertible edits.
///
/// Stores what changed rather than whole documents. `undo` hands back the
/// inverse of the last edit, `redo` hands back the edit itself; the caller
/// applies them.
///
/// `max_depth` counts documents the way [`History`](super::History) counts
/// snapshots: the base document takes one slot, so at most `max_depth - 1`
/// edits can be undone.
#[derive(Debug, Clone)]
pub struct InverseLog<C: Invertible> {
    undo_stack: Vector<C>,
    redo_stack: Vector<C>,
    max_depth: usize,
}

impl<C: Invertible> Default for InverseLog<C> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl<C: Invertible> InverseLog<C> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vector::new(),
            redo_stack: Vector::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn push(&mut self, item: C) {
        self.undo_stack.push_back(item);
        while self.undo_stack.len() >= self.max_depth {
            self.undo_stack.pop_front();
        }
        self.redo_stack = Vector::new();
    }

    pub fn undo(&mut self) -> Option<C> {
        let item = self.undo_stack.pop_back()?;
        let inverted = item.invert();
        self.redo_stack.push_back(item);
        Some(inverted)
    }

    pub fn redo(&mut self) -> Option<C> {
        let item = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(item.clone());
        Some(item)
    }

    pub fn clear(&mut self) {
        self.undo_stack = Vector::new();
        self.redo_stack = Vector::new();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len() + self.redo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// History with the same push/undo/redo/current/clear surface as
/// [`History`](super::History), backed by an [`InverseLog`] so only one
/// document value is held at a time.
#[derive(Debug, Clone)]
pub struct InverseHistory<D: DocumentTraits + Default, C: Reversible<D>> {
    log: InverseLog<C>,
    current: Option<Rc<D>>,
}

impl<D: DocumentTraits + Default, C: Reversible<D>> Default for InverseHistory<D, C> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl<D: DocumentTraits + Default, C: Reversible<D>> InverseHistory<D, C> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            log: InverseLog::new(max_depth),
            current: None,
        }
    }

    /// Starts tracking `document` with an empty log.
    pub fn open(&mut self, document: D) {
        self.log.clear();
        self.current = Some(Rc::new(document));
    }

    pub fn push(&mut self, edit: C) -> Result<Rc<D>, EditorError> {
        let base = self.current.clone().unwrap_or_default();
        let next = Rc::new(edit.apply(&base)?);
        self.log.push(edit);
        self.current = Some(next.clone());
        Ok(next)
    }

    pub fn undo(&mut self) -> Option<Rc<D>> {
        if let Some(inverse) = self.log.undo() {
            self.replay(inverse);
        }
        self.current()
    }

    pub fn redo(&mut self) -> Option<Rc<D>> {
        if let Some(edit) = self.log.redo() {
            self.replay(edit);
        }
        self.current()
    }

    pub fn current(&self) -> Option<Rc<D>> {
        self.current.clone()
    }

    pub fn clear(&mut self) {
        self.log.clear();
        self.current = None;
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    fn replay(&mut self, edit: C) {
        let base = self.current.clone().unwrap_or_default();
        match edit.apply(&base) {
            Ok(next) => {
                debug!(?edit, "inverse history replay");
                self.current = Some(Rc::new(next));
            }
            Err(error) => warn!(%error, ?edit, "inverse history replay rejected"),
        }
    }
}
