use im::Vector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::ElementId;

use super::{record_id, Element};

/// A process diagram: the document edited under history tracking.
///
/// Fields the client does not interpret are preserved in `extra` so a
/// round-trip through the editor never drops server data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDocument {
    #[serde(
        default,
        deserialize_with = "record_id::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub elements: Vector<Element>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProcessDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn set_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..self.clone()
        }
    }

    pub fn with_elements<I>(&self, elements: I) -> Self
    where
        I: IntoIterator<Item = Element>,
    {
        Self {
            elements: elements.into_iter().collect(),
            ..self.clone()
        }
    }

    pub fn position_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|element| &element.id == id)
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|element| &element.id == id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.position_of(id).is_some()
    }

    /// Generates an element id not yet used in this document.
    pub fn fresh_element_id(&self) -> ElementId {
        let mut id = ElementId::generate();
        while self.contains(&id) {
            id = ElementId::generate();
        }
        id
    }

    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }
}
