use std::fmt;

use im::OrdMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::ElementId;

pub type Properties = OrdMap<String, Value>;

/// Type tag of a diagram element.
///
/// The palette kinds get their own variants; anything else the backend sends
/// is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    StartEvent,
    EndEvent,
    Task,
    Gateway,
    Pool,
    Lane,
    DataObject,
    Annotation,
    Other(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::StartEvent => "start-event",
            ElementKind::EndEvent => "end-event",
            ElementKind::Task => "task",
            ElementKind::Gateway => "gateway",
            ElementKind::Pool => "pool",
            ElementKind::Lane => "lane",
            ElementKind::DataObject => "data-object",
            ElementKind::Annotation => "annotation",
            ElementKind::Other(kind) => kind,
        }
    }

    pub fn default_label(&self) -> String {
        format!("New {}", self.as_str())
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ElementKind {
    fn from(kind: &str) -> Self {
        match kind {
            "start-event" => ElementKind::StartEvent,
            "end-event" => ElementKind::EndEvent,
            "task" => ElementKind::Task,
            "gateway" => ElementKind::Gateway,
            "pool" => ElementKind::Pool,
            "lane" => ElementKind::Lane,
            "data-object" => ElementKind::DataObject,
            "annotation" => ElementKind::Annotation,
            other => ElementKind::Other(other.to_string()),
        }
    }
}

impl From<String> for ElementKind {
    fn from(kind: String) -> Self {
        ElementKind::from(kind.as_str())
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub label: String,
    #[serde(default)]
    pub properties: Properties,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind, x: f64, y: f64) -> Self {
        Self {
            id,
            label: kind.default_label(),
            kind,
            x,
            y,
            properties: Properties::new(),
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}
