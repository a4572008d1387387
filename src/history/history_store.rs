use im::Vector;
use tracing::debug;

use crate::prelude::DocumentTraits;

use super::history_item::Snapshot;

pub const DEFAULT_MAX_DEPTH: usize = 100;

/// A [`History`] of whole-document snapshots with an undo/redo cursor.
///
/// Every operation is total: moving past either end of the history saturates
/// instead of failing.
#[derive(Debug, Clone)]
pub struct History<D: DocumentTraits> {
    /// Snapshots in the order they were pushed, oldest at the front.
    snapshots: Vector<Snapshot<D>>,
    /// Index of the visible snapshot. `None` means the history is empty.
    ///
    /// **Invariant**: `cursor.is_none() == snapshots.is_empty()` and
    /// `cursor < snapshots.len()`.
    cursor: Option<usize>,
    /// Once exceeded, the oldest snapshots are evicted.
    max_depth: usize,
}

impl<D: DocumentTraits> Default for History<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DocumentTraits> History<D> {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            snapshots: Vector::new(),
            cursor: None,
            max_depth: max_depth.max(1),
        }
    }

    /// Discards the redo branch, appends `snapshot` and makes it current.
    pub fn push(&mut self, snapshot: Snapshot<D>) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.snapshots.truncate(keep);
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.max_depth {
            self.snapshots.pop_front();
        }
        self.cursor = Some(self.snapshots.len() - 1);
        debug!(
            cursor = ?self.cursor,
            len = self.snapshots.len(),
            "history push"
        );
    }

    pub fn undo(&mut self) -> Option<&Snapshot<D>> {
        if let Some(cursor) = self.cursor.filter(|cursor| *cursor > 0) {
            self.cursor = Some(cursor - 1);
            debug!(cursor = cursor - 1, "history undo");
        }
        self.current()
    }

    pub fn redo(&mut self) -> Option<&Snapshot<D>> {
        if let Some(cursor) = self.cursor.filter(|cursor| cursor + 1 < self.snapshots.len()) {
            self.cursor = Some(cursor + 1);
            debug!(cursor = cursor + 1, "history redo");
        }
        self.current()
    }

    pub fn current(&self) -> Option<&Snapshot<D>> {
        self.cursor.and_then(|cursor| self.snapshots.get(cursor))
    }

    /// Replaces every snapshot with `f` of its document, keeping actions and
    /// the cursor.
    pub fn rebase(&mut self, f: impl Fn(&D) -> D) {
        self.snapshots = self
            .snapshots
            .iter()
            .map(|snapshot| Snapshot::new(f(snapshot.document()), snapshot.action))
            .collect();
        debug!(len = self.snapshots.len(), "history rebase");
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor + 1 < self.snapshots.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot<D>> {
        self.snapshots.iter()
    }
}
