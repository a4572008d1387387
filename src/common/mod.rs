use core::fmt::Debug;

mod editor_error;
mod element_id;

pub use editor_error::*;
pub use element_id::*;

/// Bounds shared by every value that can be tracked by a history.
pub trait DocumentTraits: Clone + PartialEq + Debug + 'static {}

impl<T: Clone + PartialEq + Debug + 'static> DocumentTraits for T {}
