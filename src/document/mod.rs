mod element;
mod process_document;
mod records;
pub(crate) mod record_id;

pub use element::*;
pub use process_document::*;
pub use records::*;
