//! The monotonic merge rule.
//!
//! Scalars are first-writer-wins, lists grow by ordered de-duplicated union,
//! maps recurse per key. Merging is left-biased, so the fold order decides
//! which document's scalar survives; re-applying a record already merged is
//! a no-op.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use kbforge_shared::{
    CapabilityRecord, CommandRouteRecord, EconomicsRecord, QualityCheckRecord, RecoveryRecord,
    TriggerRecord, WorkflowRecord,
};

/// A record that can absorb a later partial record of the same identity.
pub trait Merge {
    fn merge_from(&mut self, incoming: Self);
}

/// Merge `incoming` into `existing`, or adopt it when there is nothing yet.
pub fn merge<R: Merge>(existing: Option<R>, incoming: R) -> R {
    match existing {
        Some(mut record) => {
            record.merge_from(incoming);
            record
        }
        None => incoming,
    }
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

fn fill<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if slot.is_none() {
        *slot = incoming;
    }
}

fn union<T: PartialEq>(list: &mut Vec<T>, incoming: Vec<T>) {
    for item in incoming {
        if !list.contains(&item) {
            list.push(item);
        }
    }
}

fn merge_map<V: Merge>(map: &mut BTreeMap<String, V>, incoming: BTreeMap<String, V>) {
    for (key, value) in incoming {
        match map.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => slot.get_mut().merge_from(value),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

impl Merge for CapabilityRecord {
    fn merge_from(&mut self, incoming: Self) {
        fill(&mut self.purpose, incoming.purpose);
        union(&mut self.capabilities, incoming.capabilities);
        union(&mut self.best_for, incoming.best_for);
        fill(&mut self.token_cost, incoming.token_cost);
        fill(&mut self.success_rate, incoming.success_rate);
        fill(&mut self.fallback, incoming.fallback);
        merge_map(&mut self.workflows, incoming.workflows);
    }
}

impl Merge for WorkflowRecord {
    fn merge_from(&mut self, incoming: Self) {
        fill(&mut self.capability, incoming.capability);
        union(&mut self.trigger, incoming.trigger);
        fill(&mut self.process, incoming.process);
        union(&mut self.standards, incoming.standards);
        fill(&mut self.example, incoming.example);
    }
}

impl Merge for TriggerRecord {
    fn merge_from(&mut self, incoming: Self) {
        union(&mut self.patterns, incoming.patterns);
        union(&mut self.keywords, incoming.keywords);
        // `required` is derived from `action`; both come from the same writer.
        if self.action.is_none() {
            self.action = incoming.action;
            self.required = incoming.required;
        }
    }
}

impl Merge for QualityCheckRecord {
    fn merge_from(&mut self, incoming: Self) {
        union(&mut self.success_criteria, incoming.success_criteria);
        union(&mut self.partial_results, incoming.partial_results);
        union(&mut self.failure_recovery, incoming.failure_recovery);
    }
}

impl Merge for RecoveryRecord {
    fn merge_from(&mut self, incoming: Self) {
        for (strategy, action) in incoming.strategies {
            self.strategies.entry(strategy).or_insert(action);
        }
    }
}

impl Merge for EconomicsRecord {
    fn merge_from(&mut self, incoming: Self) {
        fill(&mut self.budget_allocation, incoming.budget_allocation);
        fill(&mut self.intelligent_escalation, incoming.intelligent_escalation);
        union(&mut self.abort_conditions, incoming.abort_conditions);
        union(&mut self.efficiency_patterns, incoming.efficiency_patterns);
    }
}

impl Merge for CommandRouteRecord {
    fn merge_from(&mut self, incoming: Self) {
        union(&mut self.capabilities, incoming.capabilities);
    }
}
