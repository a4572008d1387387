use std::rc::Rc;

use leptos_reactive::{
    create_signal, ReadSignal, SignalGetUntracked, SignalSet, SignalWithUntracked, WriteSignal,
};
use serde_json::Value;
use tracing::warn;

use crate::prelude::{
    ElementId, ElementKind, EditorError, History, HistoryInterface, ProcessDocument, Snapshot,
};

use super::{apply_mutation, utils::log_edit, DocumentEdit, ElementUpdate, Mutation, NewElement};

/// Editing session for one process document.
///
/// All edits go through [`DocumentMutator::apply`], which computes the next
/// document value, pushes it onto the history and keeps the selection
/// consistent with whatever document is visible.
#[derive(Debug)]
pub struct DocumentMutator {
    history: HistoryInterface<ProcessDocument>,
    pub selected_element: ReadSignal<Option<ElementId>>,
    set_selected_element: WriteSignal<Option<ElementId>>,
}

impl DocumentMutator {
    pub fn new(max_depth: usize) -> Self {
        let (selected_element, set_selected_element) = create_signal(None);
        Self {
            history: HistoryInterface::new(History::with_max_depth(max_depth)),
            selected_element,
            set_selected_element,
        }
    }

    pub fn history(&self) -> &HistoryInterface<ProcessDocument> {
        &self.history
    }

    /// Starts a fresh history whose only snapshot is `document`.
    pub fn open(&self, document: ProcessDocument) {
        self.history.clear();
        self.history.push(Snapshot::new(document, "open"));
        self.set_selected_element.set(None);
    }

    pub fn close(&self) {
        self.history.clear();
        self.set_selected_element.set(None);
    }

    pub fn current(&self) -> Option<Rc<ProcessDocument>> {
        self.history.current()
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected_element.get_untracked()
    }

    /// Applies `mutation` to the visible document.
    ///
    /// Returns the edit that was pushed, or `None` when the mutation left the
    /// document unchanged. A mutation naming an unknown element is reported
    /// and nothing is pushed.
    pub fn apply(&self, mutation: Mutation) -> Result<Option<DocumentEdit>, EditorError> {
        let current = self.current().unwrap_or_default();
        let outcome = match apply_mutation(&current, &mutation) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(%error, action = mutation.action_name(), "mutation rejected");
                return Err(error);
            }
        };
        if outcome.document == *current {
            return Ok(None);
        }

        log_edit(&outcome.edit);
        if let Mutation::Delete(id) = &mutation {
            if self.selected_element.with_untracked(|selected| selected.as_ref() == Some(id)) {
                self.set_selected_element.set(None);
            }
        }
        self.history
            .push(Snapshot::new(outcome.document, mutation.action_name()));
        Ok(Some(outcome.edit))
    }

    pub fn add_element(
        &self,
        kind: impl Into<ElementKind>,
        x: f64,
        y: f64,
    ) -> Result<ElementId, EditorError> {
        let id = self.current().unwrap_or_default().fresh_element_id();
        self.apply(Mutation::Add(
            NewElement::new(kind, x, y).set_id(id.clone()),
        ))?;
        Ok(id)
    }

    pub fn update_element(&self, update: ElementUpdate) -> Result<Option<DocumentEdit>, EditorError> {
        self.apply(Mutation::Update(update))
    }

    pub fn move_element(&self, id: &ElementId, x: f64, y: f64) -> Result<Option<DocumentEdit>, EditorError> {
        self.update_element(ElementUpdate::new(id.clone()).move_to(x, y))
    }

    pub fn relabel_element(
        &self,
        id: &ElementId,
        label: impl Into<String>,
    ) -> Result<Option<DocumentEdit>, EditorError> {
        self.update_element(ElementUpdate::new(id.clone()).set_label(label))
    }

    pub fn set_property(
        &self,
        id: &ElementId,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Option<DocumentEdit>, EditorError> {
        self.update_element(ElementUpdate::new(id.clone()).set_property(key, value))
    }

    pub fn delete_element(&self, id: &ElementId) -> Result<Option<DocumentEdit>, EditorError> {
        self.apply(Mutation::Delete(id.clone()))
    }

    pub fn select(&self, id: &ElementId) -> Result<(), EditorError> {
        let exists = self
            .current()
            .map(|document| document.contains(id))
            .unwrap_or(false);
        if !exists {
            warn!(%id, "selection of unknown element");
            return Err(EditorError::ElementNotFound(id.clone()));
        }
        self.set_selected_element.set(Some(id.clone()));
        Ok(())
    }

    pub fn deselect(&self) {
        self.set_selected_element.set(None);
    }

    pub fn undo(&self) -> Option<Rc<ProcessDocument>> {
        let current = self.history.undo();
        self.reconcile_selection(current.as_deref());
        current
    }

    pub fn redo(&self) -> Option<Rc<ProcessDocument>> {
        let current = self.history.redo();
        self.reconcile_selection(current.as_deref());
        current
    }

    /// Adopts the server's copy of the open document.
    ///
    /// Every snapshot takes `saved`'s fields but keeps its own elements, so
    /// the undo/redo position and the selection are unaffected. Ignored when
    /// `saved` is a different document.
    pub fn refresh_saved(&self, saved: &ProcessDocument) {
        let is_open = self
            .current()
            .map(|document| document.id.is_some() && document.id == saved.id)
            .unwrap_or(false);
        if !is_open {
            return;
        }
        self.history.rebase(|document| ProcessDocument {
            elements: document.elements.clone(),
            ..saved.clone()
        });
    }

    /// Drops every snapshot, the visible one included.
    pub fn clear_history(&self) {
        self.history.clear();
        self.set_selected_element.set(None);
    }

    fn reconcile_selection(&self, current: Option<&ProcessDocument>) {
        let dangling = self.selected_element.with_untracked(|selected| match selected {
            Some(id) => !current.map(|document| document.contains(id)).unwrap_or(false),
            None => false,
        });
        if dangling {
            self.set_selected_element.set(None);
        }
    }
}
