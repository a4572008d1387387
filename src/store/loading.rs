use std::cell::Cell;

use leptos_reactive::{create_signal, ReadSignal, SignalGetUntracked, SignalSet, WriteSignal};

/// Reactive "request in flight" flag.
///
/// Counts overlapping requests so the flag only drops once the last one has
/// finished.
#[derive(Debug)]
pub struct LoadingFlag {
    pub is_loading: ReadSignal<bool>,
    set_is_loading: WriteSignal<bool>,
    in_flight: Cell<usize>,
}

impl Default for LoadingFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingFlag {
    pub fn new() -> Self {
        let (is_loading, set_is_loading) = create_signal(false);
        Self {
            is_loading,
            set_is_loading,
            in_flight: Cell::new(0),
        }
    }

    pub fn lock(&self) {
        self.in_flight.set(self.in_flight.get() + 1);
        if !self.is_loading.get_untracked() {
            self.set_is_loading.set(true);
        }
    }

    pub fn unlock(&self) {
        let remaining = self.in_flight.get().saturating_sub(1);
        self.in_flight.set(remaining);
        if remaining == 0 {
            self.set_is_loading.set(false);
        }
    }

    /// Locks until the returned guard is dropped, whichever way the request
    /// finishes.
    pub fn guard(&self) -> LoadingGuard<'_> {
        self.lock();
        LoadingGuard { flag: self }
    }

    pub fn get(&self) -> bool {
        self.is_loading.get_untracked()
    }
}

#[must_use]
pub struct LoadingGuard<'a> {
    flag: &'a LoadingFlag,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.unlock();
    }
}
