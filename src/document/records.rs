use core::fmt::Debug;

use im::Vector;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sync::Resource;

use super::{record_id, ProcessDocument};

/// A value stored under one of the backend's CRUD collections.
pub trait Record: Clone + PartialEq + Debug + Serialize + DeserializeOwned + 'static {
    const RESOURCE: Resource;

    fn record_id(&self) -> Option<&str>;
}

impl Record for ProcessDocument {
    const RESOURCE: Resource = Resource::Processes;

    fn record_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(
        default,
        deserialize_with = "record_id::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Policy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Record for Policy {
    const RESOURCE: Resource = Resource::Policies;

    fn record_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// A business rule: a condition paired with the action it triggers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(
        default,
        deserialize_with = "record_id::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn set_condition(&self, condition: impl Into<String>) -> Self {
        Self {
            condition: Some(condition.into()),
            ..self.clone()
        }
    }

    pub fn set_action(&self, action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..self.clone()
        }
    }
}

impl Record for Rule {
    const RESOURCE: Resource = Resource::Rules;

    fn record_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        deserialize_with = "record_id::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Shallow merge: every field present in `fields` overrides the current value.
    pub fn merge_fields(&self, fields: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        for (key, value) in fields {
            merged.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(merged))
    }
}

/// One row of a compliance matrix or waste analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisEntry {
    #[serde(
        default,
        deserialize_with = "record_id::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl AnalysisEntry {
    pub fn merge(&self, other: &AnalysisEntry) -> Self {
        let mut fields = self.fields.clone();
        for (key, value) in other.fields.iter() {
            fields.insert(key.clone(), value.clone());
        }
        Self {
            id: self.id.clone(),
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAnalysis {
    #[serde(default)]
    pub compliance_matrix: Vector<AnalysisEntry>,
    #[serde(default)]
    pub waste_analysis: Vector<AnalysisEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRequest {
    pub process_id: String,
    pub policy_ids: Vec<String>,
}
