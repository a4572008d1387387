use crate::prelude::{EditorError, Element, Invertible, ProcessDocument, Reversible};

/// The structural change a mutation made to a document's element sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEdit {
    Insert {
        index: usize,
        element: Element,
    },
    Remove {
        index: usize,
        element: Element,
    },
    Replace {
        index: usize,
        before: Element,
        after: Element,
    },
}

impl DocumentEdit {
    pub fn index(&self) -> usize {
        match self {
            DocumentEdit::Insert { index, .. }
            | DocumentEdit::Remove { index, .. }
            | DocumentEdit::Replace { index, .. } => *index,
        }
    }

    pub fn apply_to(&self, document: &ProcessDocument) -> Result<ProcessDocument, EditorError> {
        let mut elements = document.elements.clone();
        match self {
            DocumentEdit::Insert { index, element } => {
                if *index > elements.len() || document.contains(&element.id) {
                    return Err(EditorError::StaleEdit { index: *index });
                }
                elements.insert(*index, element.clone());
            }
            DocumentEdit::Remove { index, element } => {
                if elements.get(*index).map(|found| &found.id) != Some(&element.id) {
                    return Err(EditorError::StaleEdit { index: *index });
                }
                elements.remove(*index);
            }
            DocumentEdit::Replace {
                index,
                before,
                after,
            } => {
                if elements.get(*index).map(|found| &found.id) != Some(&before.id) {
                    return Err(EditorError::StaleEdit { index: *index });
                }
                elements.set(*index, after.clone());
            }
        }
        Ok(ProcessDocument {
            elements,
            ..document.clone()
        })
    }
}

impl Invertible for DocumentEdit {
    fn invert(&self) -> Self {
        match self {
            DocumentEdit::Insert { index, element } => DocumentEdit::Remove {
                index: *index,
                element: element.clone(),
            },
            DocumentEdit::Remove { index, element } => DocumentEdit::Insert {
                index: *index,
                element: element.clone(),
            },
            DocumentEdit::Replace {
                index,
                before,
                after,
            } => DocumentEdit::Replace {
                index: *index,
                before: after.clone(),
                after: before.clone(),
            },
        }
    }
}

impl Reversible<ProcessDocument> for DocumentEdit {
    fn apply(&self, document: &ProcessDocument) -> Result<ProcessDocument, EditorError> {
        self.apply_to(document)
    }
}
