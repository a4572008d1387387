//! Client core for a process, policy and rule management studio.
//!
//! * [`history`] keeps bounded undo/redo histories of immutable document
//!   snapshots.
//! * [`mutation`] turns element-level edits into new document values and
//!   pushes them onto a history.
//! * [`sync`] talks to the REST backend, and [`store`] wraps it in reactive
//!   state containers with loading and notification handling.

pub mod common;
pub mod config;
pub mod document;
pub mod history;
pub mod mutation;
pub mod store;
pub mod sync;

#[cfg(test)]
mod test_support;

pub mod prelude {
    pub use crate::common::*;
    pub use crate::config::*;
    pub use crate::document::*;
    pub use crate::history::*;
    pub use crate::mutation::*;
    pub use crate::store::*;
    pub use crate::sync::*;
}

pub use prelude::*;
