use kbforge_dialect::Mapping;
use kbforge_shared::{Entity, QualityCheckRecord};

use crate::fields::{FieldWarning, entries};
use crate::{EntityExtractor, ExtractContext};

const SECTIONS: &[&str] = &["Quality_Control"];

/// Quality checks from `Quality_Control`; `Core_Validation` names `Core`.
pub struct QualityCheckExtractor;

impl EntityExtractor for QualityCheckExtractor {
    fn name(&self) -> &str {
        "quality check"
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
        entries(tree, SECTIONS[0], ctx.delimiter, warnings)
            .into_iter()
            .map(|(name, fields)| {
                let mut record = QualityCheckRecord::named(name.strip_suffix("_Validation").unwrap_or(name));
                record.success_criteria = fields.list("Success_Criteria", warnings);
                record.partial_results = fields.list("Partial_Results", warnings);
                record.failure_recovery = fields.list("Failure_Recovery", warnings);
                Entity::QualityCheck(record)
            })
            .collect()
    }
}
