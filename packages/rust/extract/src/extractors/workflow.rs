use kbforge_dialect::Mapping;
use kbforge_shared::{Entity, WorkflowRecord};

use crate::fields::{Fields, FieldWarning, entries};
use crate::routing::infer_capability;
use crate::{EntityExtractor, ExtractContext};

const SECTIONS: &[&str] = &["Workflows", "MCP_Workflows"];

/// Workflow patterns from `Workflows` / `MCP_Workflows`.
pub struct WorkflowExtractor;

impl EntityExtractor for WorkflowExtractor {
    fn name(&self) -> &str {
        "workflow"
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
                let mut record = read_workflow(name, &fields, warnings);
                record.capability = fields
                    .scalar("Capability", warnings)
                    .or_else(|| fields.scalar("Server", warnings))
                    .or_else(|| infer_capability(name, &ctx.routing.workflow_hints));
                out.push(Entity::Workflow(record));
            }
        }
        out
    }
}

/// The workflow fields shared by standalone workflows and capability variants.
pub(crate) fn read_workflow(
    name: &str,
    fields: &Fields<'_>,
    warnings: &mut Vec<FieldWarning>,
) -> WorkflowRecord {
    WorkflowRecord {
        name: name.to_string(),
        capability: None,
        trigger: fields.list("Trigger", warnings),
        process: fields.scalar("Process", warnings),
        standards: fields.list("Standards", warnings),
        example: fields.scalar("Example", warnings),
    }
}
