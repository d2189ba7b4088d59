//! The knowledge base: one merged record per named entity.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use kbforge_shared::{
    CapabilityRecord, CommandRouteRecord, EconomicsRecord, Entity, QualityCheckRecord,
    RecoveryRecord, Result, TriggerRecord, WorkflowRecord,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::merge::Merge;

/// Everything detection learned, keyed by entity name.
///
/// All maps are ordered, so serializing the same knowledge base always yields
/// the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub capabilities: BTreeMap<String, CapabilityRecord>,
    #[serde(default)]
    pub workflows: BTreeMap<String, WorkflowRecord>,
    #[serde(default)]
    pub triggers: BTreeMap<String, TriggerRecord>,
    #[serde(default)]
    pub quality_checks: BTreeMap<String, QualityCheckRecord>,
    #[serde(default)]
    pub recoveries: BTreeMap<String, RecoveryRecord>,
    #[serde(default)]
    pub economics: EconomicsRecord,
    #[serde(default)]
    pub command_routes: BTreeMap<String, CommandRouteRecord>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one partial record into the matching entry.
    pub fn absorb(&mut self, entity: Entity) {
        match entity {
            Entity::Capability(r) => absorb_named(&mut self.capabilities, r.name.clone(), r),
            Entity::Workflow(r) => absorb_named(&mut self.workflows, r.name.clone(), r),
            Entity::Trigger(r) => absorb_named(&mut self.triggers, r.name.clone(), r),
            Entity::QualityCheck(r) => absorb_named(&mut self.quality_checks, r.name.clone(), r),
            Entity::Recovery(r) => absorb_named(&mut self.recoveries, r.name.clone(), r),
            Entity::Economics(r) => self.economics.merge_from(r),
            Entity::CommandRoute(r) => absorb_named(&mut self.command_routes, r.command.clone(), r),
        }
    }

    /// Merge records in order.
    pub fn absorb_all(&mut self, entities: impl IntoIterator<Item = Entity>) {
        for entity in entities {
            self.absorb(entity);
        }
    }

    /// Standalone workflows owned by `capability`.
    pub fn workflows_for(&self, capability: &str) -> Vec<&WorkflowRecord> {
        self.workflows
            .values()
            .filter(|w| w.capability.as_deref() == Some(capability))
            .collect()
    }

    /// Number of named records, plus one when economics is set.
    pub fn entity_count(&self) -> usize {
        self.capabilities.len()
            + self.workflows.len()
            + self.triggers.len()
            + self.quality_checks.len()
            + self.recoveries.len()
            + self.command_routes.len()
            + usize::from(!self.economics.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    /// SHA-256 (hex) of the canonical JSON form.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

fn absorb_named<R: Merge>(map: &mut BTreeMap<String, R>, name: String, record: R) {
    match map.entry(name) {
        Entry::Vacant(slot) => {
            slot.insert(record);
        }
        Entry::Occupied(mut slot) => slot.get_mut().merge_from(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(name: &str, capability: Option<&str>) -> Entity {
        Entity::Workflow(WorkflowRecord {
            capability: capability.map(str::to_string),
            ..WorkflowRecord::named(name)
        })
    }

    #[test]
    fn absorb_merges_by_name() {
        let mut kb = KnowledgeBase::new();
        kb.absorb(Entity::Capability(CapabilityRecord {
            purpose: Some("indexing".into()),
            ..CapabilityRecord::named("Core")
        }));
        kb.absorb(Entity::Capability(CapabilityRecord {
            purpose: Some("other".into()),
            capabilities: vec!["scan".into()],
            ..CapabilityRecord::named("Core")
        }));
        kb.absorb(Entity::Capability(CapabilityRecord::named("Aux")));

        assert_eq!(kb.capabilities.len(), 2);
        let core = &kb.capabilities["Core"];
        assert_eq!(core.purpose.as_deref(), Some("indexing"));
        assert_eq!(core.capabilities, vec!["scan".to_string()]);
    }

    #[test]
    fn counts_and_queries() {
        let mut kb = KnowledgeBase::new();
        assert!(kb.is_empty());

        kb.absorb_all([
            workflow("Library_Research", Some("Context7")),
            workflow("Docs_Lookup", Some("Context7")),
            workflow("Deploy", None),
            Entity::Economics(EconomicsRecord {
                budget_allocation: Some("tight".into()),
                ..EconomicsRecord::default()
            }),
        ]);

        assert_eq!(kb.entity_count(), 4);
        let names: Vec<_> = kb.workflows_for("Context7").iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Docs_Lookup", "Library_Research"]);
        assert!(kb.workflows_for("Magic").is_empty());
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let mut a = KnowledgeBase::new();
        a.absorb(workflow("B", None));
        a.absorb(workflow("A", None));

        let mut b = KnowledgeBase::new();
        b.absorb(workflow("A", None));
        b.absorb(workflow("B", None));

        let fa = a.fingerprint().unwrap();
        assert_eq!(fa.len(), 64);
        assert_eq!(fa, b.fingerprint().unwrap());

        b.absorb(workflow("C", None));
        assert_ne!(fa, b.fingerprint().unwrap());
    }

    #[test]
    fn serializes_round_trip() {
        let mut kb = KnowledgeBase::new();
        kb.absorb(Entity::CommandRoute(CommandRouteRecord {
            command: "build".into(),
            capabilities: vec!["Magic".into()],
        }));
        let json = serde_json::to_string(&kb).unwrap();
        let back: KnowledgeBase = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kb);
    }
}
