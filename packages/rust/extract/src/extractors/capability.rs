use kbforge_dialect::{Mapping, Node};
use kbforge_shared::{CapabilityRecord, Entity, WorkflowRecord};

use super::workflow::read_workflow;
use crate::fields::{FieldWarning, Fields, entries, push_unique, scalar_text, split_joined};
use crate::{EntityExtractor, ExtractContext};

const SECTIONS: &[&str] = &["Servers", "Server_Capabilities_Extended"];

/// Capability records from `Servers` and `Server_Capabilities_Extended`.
///
/// The two sections describe capabilities differently: the first as a list
/// of names (optionally `name: description` strings or single-key maps),
/// the second as one delimiter-joined string plus a free-text `Use`. Both
/// normalize to the same `capabilities` list.
pub struct CapabilityExtractor;

impl EntityExtractor for CapabilityExtractor {
    fn name(&self) -> &str {
        "capability"
    }

    fn sections(&self) -> &[&'static str] {
        SECTIONS
    }

    fn extract(
        &self,
        tree: &Mapping,
        ctx: &ExtractContext<'_>,
        warnings: &mut Vec<FieldWarning>,
    ) -> Vec<Entity> {
        let mut out = Vec::new();
        for section in SECTIONS {
            for (name, fields) in entries(tree, section, ctx.delimiter, warnings) {
                out.push(Entity::Capability(read_capability(name, &fields, warnings)));
            }
        }
        out
    }
}

fn read_capability(name: &str, fields: &Fields<'_>, warnings: &mut Vec<FieldWarning>) -> CapabilityRecord {
    let mut record = CapabilityRecord::named(name);
    record.purpose = fields.scalar("Purpose", warnings);
    record.capabilities = capability_names(fields, warnings);
    record.best_for = fields.list("Best_For", warnings);
    record.token_cost = fields.scalar("Token_Cost", warnings);
    record.success_rate = fields.scalar("Success_Rate", warnings);
    record.fallback = fields.scalar("Fallback", warnings);

    for usage in fields.list("Use", warnings) {
        push_unique(&mut record.capabilities, usage);
    }

    match fields.get("Workflows") {
        None => {}
        Some(Node::Map(variants)) => {
            for (variant, node) in variants.iter() {
                let path = format!("{}.{variant}", fields.child_path("Workflows"));
                match node {
                    Node::Map(map) => {
                        let variant_fields = Fields::new(map, path, fields.delimiter());
                        let mut workflow = read_workflow(variant, &variant_fields, warnings);
                        workflow.capability = Some(name.to_string());
                        record.workflows.insert(variant.to_string(), workflow);
                    }
                    Node::Null => {}
                    other => warnings.push(FieldWarning::new(path, "a mapping", other)),
                }
            }
        }
        Some(other) => match scalar_text(other) {
            Some(process) => {
                let workflow = WorkflowRecord {
                    capability: Some(name.to_string()),
                    process: Some(process.trim().to_string()),
                    ..WorkflowRecord::named("default")
                };
                record.workflows.insert("default".into(), workflow);
            }
            None => warnings.push(FieldWarning::new(
                fields.child_path("Workflows"),
                "a string or mapping",
                other,
            )),
        },
    }

    record
}

/// `Capabilities` in any of its accepted shapes.
fn capability_names(fields: &Fields<'_>, warnings: &mut Vec<FieldWarning>) -> Vec<String> {
    let Some(node) = fields.get("Capabilities") else {
        return Vec::new();
    };

    let mut names = Vec::new();
    match node {
        Node::Seq(items) => {
            for item in items {
                match item {
                    Node::Map(map) => {
                        for key in map.keys() {
                            push_unique(&mut names, key.to_string());
                        }
                    }
                    other => match scalar_text(other) {
                        Some(text) => {
                            let name = text.split_once(':').map_or(text.as_str(), |(n, _)| n).trim();
                            if !name.is_empty() {
                                push_unique(&mut names, name.to_string());
                            }
                        }
                        None => warnings.push(FieldWarning::new(
                            fields.child_path("Capabilities"),
                            "a string item",
                            other,
                        )),
                    },
                }
            }
        }
        Node::Map(map) => {
            for key in map.keys() {
                push_unique(&mut names, key.to_string());
            }
        }
        other => match scalar_text(other) {
            Some(text) => names = split_joined(&text, fields.delimiter()),
            None => warnings.push(FieldWarning::new(
                fields.child_path("Capabilities"),
                "a list of strings",
                other,
            )),
        },
    }
    names
}
