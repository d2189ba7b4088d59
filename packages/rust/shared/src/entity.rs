//! Entity records that make up a knowledge base.
//!
//! Every field is independently settable: scalars are `Option`s (unset until
//! some document provides them), lists start empty and only grow. The same
//! structs carry both partial records (one document's contribution) and the
//! merged record held by the knowledge base.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A capability provider (e.g. a tool server) and what it is good for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub best_for: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    /// Named workflow variants attached directly to this capability.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub workflows: BTreeMap<String, WorkflowRecord>,
}

impl CapabilityRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A named workflow pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub name: String,
    /// Capability that runs this workflow, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trigger: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl WorkflowRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// An automatic activation rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Set together with `action`: whether the action is mandatory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl TriggerRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Quality check
// ---------------------------------------------------------------------------

/// Validation criteria for one capability's results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheckRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partial_results: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_recovery: Vec<String>,
}

impl QualityCheckRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

/// Named error-recovery strategies for one capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    pub name: String,
    /// Failure mode → recovery action.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub strategies: BTreeMap<String, String>,
}

impl RecoveryRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Economics
// ---------------------------------------------------------------------------

/// Global cost/budget parameters. There is exactly one per knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicsRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_allocation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intelligent_escalation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abort_conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub efficiency_patterns: Vec<String>,
}

impl EconomicsRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Command route
// ---------------------------------------------------------------------------

/// Which capabilities a command uses by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRouteRecord {
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Discriminant for the entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Capability,
    Workflow,
    Trigger,
    QualityCheck,
    Recovery,
    Economics,
    CommandRoute,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Capability => "capability",
            Self::Workflow => "workflow",
            Self::Trigger => "trigger",
            Self::QualityCheck => "quality check",
            Self::Recovery => "recovery",
            Self::Economics => "economics",
            Self::CommandRoute => "command route",
        };
        f.write_str(label)
    }
}

/// A partial record of any kind, as emitted by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Capability(CapabilityRecord),
    Workflow(WorkflowRecord),
    Trigger(TriggerRecord),
    QualityCheck(QualityCheckRecord),
    Recovery(RecoveryRecord),
    Economics(EconomicsRecord),
    CommandRoute(CommandRouteRecord),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Capability(_) => EntityKind::Capability,
            Self::Workflow(_) => EntityKind::Workflow,
            Self::Trigger(_) => EntityKind::Trigger,
            Self::QualityCheck(_) => EntityKind::QualityCheck,
            Self::Recovery(_) => EntityKind::Recovery,
            Self::Economics(_) => EntityKind::Economics,
            Self::CommandRoute(_) => EntityKind::CommandRoute,
        }
    }

    /// Identity of the record. Economics is a singleton and has no name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Capability(r) => Some(&r.name),
            Self::Workflow(r) => Some(&r.name),
            Self::Trigger(r) => Some(&r.name),
            Self::QualityCheck(r) => Some(&r.name),
            Self::Recovery(r) => Some(&r.name),
            Self::Economics(_) => None,
            Self::CommandRoute(r) => Some(&r.command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_not_serialized() {
        let record = CapabilityRecord::named("Core");
        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(json, r#"{"name":"Core"}"#);
    }

    #[test]
    fn entity_name_and_kind() {
        let entity = Entity::Recovery(RecoveryRecord::named("Context7"));
        assert_eq!(entity.kind(), EntityKind::Recovery);
        assert_eq!(entity.name(), Some("Context7"));

        let economics = Entity::Economics(EconomicsRecord::default());
        assert_eq!(economics.name(), None);
        assert_eq!(economics.kind().to_string(), "economics");
    }

    #[test]
    fn economics_emptiness() {
        let mut econ = EconomicsRecord::default();
        assert!(econ.is_empty());
        econ.abort_conditions.push("timeout".into());
        assert!(!econ.is_empty());
    }
}
