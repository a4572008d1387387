use im::OrdSet;
use serde_json::Value;

use crate::prelude::{Element, ElementId, ElementKind, Properties};

/// A partial update to one element. Unset fields are left untouched.
#[derive(Clone, PartialEq, Debug)]
pub struct ElementUpdate {
    pub id: ElementId,
    pub kind: Option<ElementKind>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub label: Option<String>,
    pub set_properties: Properties,
    pub remove_properties: OrdSet<String>,
}

impl ElementUpdate {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            x: None,
            y: None,
            label: None,
            set_properties: Properties::new(),
            remove_properties: OrdSet::new(),
        }
    }

    pub fn move_to(&self, x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..self.clone()
        }
    }

    pub fn set_label(&self, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..self.clone()
        }
    }

    pub fn set_kind(&self, kind: impl Into<ElementKind>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..self.clone()
        }
    }

    pub fn set_property(&self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        Self {
            remove_properties: self.remove_properties.without(&key),
            set_properties: self.set_properties.update(key, value),
            ..self.clone()
        }
    }

    pub fn remove_property(&self, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            set_properties: self.set_properties.without(&key),
            remove_properties: self.remove_properties.update(key),
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.x.is_none()
            && self.y.is_none()
            && self.label.is_none()
            && self.set_properties.is_empty()
            && self.remove_properties.is_empty()
    }

    /// Folds `other` into `self`; fields set in `other` win.
    pub fn merge(&self, other: Self) -> Self {
        let mut merged = Self {
            kind: other.kind.or_else(|| self.kind.clone()),
            x: other.x.or(self.x),
            y: other.y.or(self.y),
            label: other.label.or_else(|| self.label.clone()),
            ..self.clone()
        };
        for key in other.remove_properties {
            merged = merged.remove_property(key);
        }
        for (key, value) in other.set_properties {
            merged = merged.set_property(key, value);
        }
        merged
    }

    pub fn apply_to(&self, element: &Element) -> Element {
        let mut properties = element.properties.clone();
        for key in self.remove_properties.iter() {
            properties.remove(key);
        }
        for (key, value) in self.set_properties.iter() {
            properties.insert(key.clone(), value.clone());
        }
        Element {
            id: element.id.clone(),
            kind: self.kind.clone().unwrap_or_else(|| element.kind.clone()),
            x: self.x.unwrap_or(element.x),
            y: self.y.unwrap_or(element.y),
            label: self.label.clone().unwrap_or_else(|| element.label.clone()),
            properties,
        }
    }
}
