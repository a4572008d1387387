use std::{cell::RefCell, rc::Rc};

use leptos_reactive::{create_signal, ReadSignal, SignalSet, SignalWithUntracked, WriteSignal};

use crate::prelude::DocumentTraits;

use super::{history_item::Snapshot, history_store::History};

/// Reactive front of a [`History`].
///
/// The store itself is plain data; this wrapper mirrors the visible document
/// and the undo/redo availability into signals after every operation so
/// views re-render from them.
pub struct HistoryInterface<D: DocumentTraits> {
    history: RefCell<History<D>>,
    pub current: ReadSignal<Option<Rc<D>>>,
    pub can_undo: ReadSignal<bool>,
    pub can_redo: ReadSignal<bool>,
    set_current: WriteSignal<Option<Rc<D>>>,
    set_can_undo: WriteSignal<bool>,
    set_can_redo: WriteSignal<bool>,
}

impl<D: DocumentTraits> core::fmt::Debug for HistoryInterface<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HistoryInterface")
            .field("history", &self.history.borrow())
            .finish()
    }
}

impl<D: DocumentTraits> HistoryInterface<D> {
    pub fn new(history: History<D>) -> Self {
        let current_document = history.current().map(|snapshot| snapshot.document.clone());
        let (current, set_current) = create_signal(current_document);
        let (can_undo, set_can_undo) = create_signal(history.can_undo());
        let (can_redo, set_can_redo) = create_signal(history.can_redo());
        Self {
            history: RefCell::new(history),
            current,
            can_undo,
            can_redo,
            set_current,
            set_can_undo,
            set_can_redo,
        }
    }

    pub fn push(&self, snapshot: Snapshot<D>) {
        self.history.borrow_mut().push(snapshot);
        self.publish();
    }

    pub fn undo(&self) -> Option<Rc<D>> {
        self.history.borrow_mut().undo();
        self.publish();
        self.current()
    }

    pub fn redo(&self) -> Option<Rc<D>> {
        self.history.borrow_mut().redo();
        self.publish();
        self.current()
    }

    pub fn rebase(&self, f: impl Fn(&D) -> D) {
        self.history.borrow_mut().rebase(f);
        self.publish();
    }

    pub fn clear(&self) {
        self.history.borrow_mut().clear();
        self.publish();
    }

    pub fn current(&self) -> Option<Rc<D>> {
        self.history
            .borrow()
            .current()
            .map(|snapshot| snapshot.document.clone())
    }

    pub fn current_action(&self) -> Option<&'static str> {
        self.history.borrow().current().map(|snapshot| snapshot.action)
    }

    pub fn len(&self) -> usize {
        self.history.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.borrow().is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.history.borrow().cursor()
    }

    pub fn with_history<O>(&self, f: impl FnOnce(&History<D>) -> O) -> O {
        f(&self.history.borrow())
    }

    fn publish(&self) {
        let (document, can_undo, can_redo) = {
            let history = self.history.borrow();
            (
                history.current().map(|snapshot| snapshot.document.clone()),
                history.can_undo(),
                history.can_redo(),
            )
        };

        // Only notify when the visible document actually changed.
        let unchanged = self.current.with_untracked(|previous| match (previous, &document) {
            (Some(previous), Some(next)) => Rc::ptr_eq(previous, next),
            (None, None) => true,
            _ => false,
        });
        if !unchanged {
            self.set_current.set(document);
        }
        if self.can_undo.with_untracked(|previous| *previous != can_undo) {
            self.set_can_undo.set(can_undo);
        }
        if self.can_redo.with_untracked(|previous| *previous != can_redo) {
            self.set_can_redo.set(can_redo);
        }
    }
}
