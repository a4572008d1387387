use std::cell::Cell;

use im::Vector;
use leptos_reactive::{create_signal, ReadSignal, SignalGetUntracked, SignalSet, SignalUpdate, WriteSignal};

const DEFAULT_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
}

/// Transient user-visible messages, newest last. Views drain or dismiss them.
#[derive(Debug)]
pub struct Notifications {
    pub queue: ReadSignal<Vector<Notification>>,
    set_queue: WriteSignal<Vector<Notification>>,
    next_id: Cell<u64>,
    capacity: usize,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Notifications {
    pub fn new(capacity: usize) -> Self {
        let (queue, set_queue) = create_signal(Vector::new());
        Self {
            queue,
            set_queue,
            next_id: Cell::new(0),
            capacity: capacity.max(1),
        }
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Success, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Error, message.into())
    }

    fn push(&self, level: NotificationLevel, message: String) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let capacity = self.capacity;
        self.set_queue.update(|queue| {
            queue.push_back(Notification { id, level, message });
            while queue.len() > capacity {
                queue.pop_front();
            }
        });
        id
    }

    pub fn dismiss(&self, id: u64) {
        self.set_queue
            .update(|queue| queue.retain(|notification| notification.id != id));
    }

    pub fn drain(&self) -> Vector<Notification> {
        let drained = self.queue.get_untracked();
        self.set_queue.set(Vector::new());
        drained
    }

    pub fn pending(&self) -> Vector<Notification> {
        self.queue.get_untracked()
    }
}
