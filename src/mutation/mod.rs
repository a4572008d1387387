mod document_edit;
mod document_mutator;
mod new_element;
mod update_element;
pub(crate) mod utils;

pub use document_edit::*;
pub use document_mutator::*;
pub use new_element::*;
pub use update_element::*;

use crate::prelude::{ElementId, EditorError, ProcessDocument};

/// A discrete user action against a process document.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Add(NewElement),
    Update(ElementUpdate),
    Delete(ElementId),
}

impl Mutation {
    pub fn action_name(&self) -> &'static str {
        match self {
            Mutation::Add(_) => "add-element",
            Mutation::Update(_) => "update-element",
            Mutation::Delete(_) => "delete-element",
        }
    }
}

/// The next document value and the invertible edit that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub document: ProcessDocument,
    pub edit: DocumentEdit,
}

/// Computes the document that results from `mutation` without touching
/// `document`.
pub fn apply_mutation(
    document: &ProcessDocument,
    mutation: &Mutation,
) -> Result<MutationOutcome, EditorError> {
    let edit = match mutation {
        Mutation::Add(new_element) => {
            if let Some(id) = new_element.id.as_ref().filter(|id| document.contains(id)) {
                return Err(EditorError::DuplicateElement(id.clone()));
            }
            DocumentEdit::Insert {
                index: document.elements.len(),
                element: new_element.build(document),
            }
        }
        Mutation::Update(update) => {
            let index = document
                .position_of(&update.id)
                .ok_or_else(|| EditorError::ElementNotFound(update.id.clone()))?;
            let before = document.elements[index].clone();
            let after = update.apply_to(&before);
            DocumentEdit::Replace {
                index,
                before,
                after,
            }
        }
        Mutation::Delete(id) => {
            let index = document
                .position_of(id)
                .ok_or_else(|| EditorError::ElementNotFound(id.clone()))?;
            DocumentEdit::Remove {
                index,
                element: document.elements[index].clone(),
            }
        }
    };
    Ok(MutationOutcome {
        document: edit.apply_to(document)?,
        edit,
    })
}
