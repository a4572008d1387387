use serde_json::Value;

use crate::prelude::{Element, ElementId, ElementKind, ProcessDocument, Properties};

/// An element about to be dropped onto a document.
#[derive(Clone, PartialEq, Debug)]
pub struct NewElement {
    pub id: Option<ElementId>,
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub label: Option<String>,
    pub properties: Properties,
}

impl NewElement {
    pub fn new(kind: impl Into<ElementKind>, x: f64, y: f64) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            x,
            y,
            label: None,
            properties: Properties::new(),
        }
    }

    pub fn set_id(&self, id: impl Into<ElementId>) -> Self {
        Self {
            id: Some(id.into()),
            ..self.clone()
        }
    }

    pub fn set_label(&self, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..self.clone()
        }
    }

    pub fn set_property(&self, key: impl Into<String>, value: Value) -> Self {
        Self {
            properties: self.properties.update(key.into(), value),
            ..self.clone()
        }
    }

    /// Materialises the element for `document`, generating an id when none
    /// was set.
    pub fn build(&self, document: &ProcessDocument) -> Element {
        let id = self
            .id
            .clone()
            .unwrap_or_else(|| document.fresh_element_id());
        Element {
            id,
            kind: self.kind.clone(),
            x: self.x,
            y: self.y,
            label: self
                .label
                .clone()
                .unwrap_or_else(|| self.kind.default_label()),
            properties: self.properties.clone(),
        }
    }
}
