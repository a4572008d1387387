use super::ElementId;

/// Local invariant violations raised while editing a document.
///
/// These never reach the network layer; the document and the history are left
/// exactly as they were before the failed edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum EditorError {
    #[error("Editor Error: no element with ID {0}")]
    ElementNotFound(ElementId),
    #[error("Editor Error: an element with ID {0} already exists")]
    DuplicateElement(ElementId),
    #[error("Editor Error: edit does not match the document at index {index}")]
    StaleEdit { index: usize },
}
