use kbforge_dialect::Mapping;
use kbforge_shared::{EconomicsRecord, Entity};

use crate::fields::{FieldWarning, Fields, section_map};
use crate::{EntityExtractor, ExtractContext};

const SECTIONS: &[&str] = &["Token_Economics"];

/// The global economics parameters from `Token_Economics`.
pub struct EconomicsExtractor;

impl EntityExtractor for EconomicsExtractor {
    fn name(&self) -> &str {
        "economics"
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
        let Some(map) = section_map(tree, SECTIONS[0], warnings) else {
            return Vec::new();
        };
        let fields = Fields::new(map, SECTIONS[0].to_string(), ctx.delimiter);

        let record = EconomicsRecord {
            budget_allocation: fields.scalar("Budget_Allocation", warnings),
            intelligent_escalation: fields.scalar("Intelligent_Escalation", warnings),
            abort_conditions: fields.list("Abort_Conditions", warnings),
            efficiency_patterns: fields.list("Efficiency_Patterns", warnings),
        };

        if record.is_empty() {
            Vec::new()
        } else {
            vec![Entity::Economics(record)]
        }
    }
}
