use kbforge_dialect::{Mapping, Node};
use kbforge_shared::{Entity, RecoveryRecord};

use crate::fields::{FieldWarning, entries, scalar_text};
use crate::{EntityExtractor, ExtractContext};

const SECTIONS: &[&str] = &["Error_Recovery"];

/// Recovery strategies from `Error_Recovery`; `Core_Recovery` names `Core`.
pub struct RecoveryExtractor;

impl EntityExtractor for RecoveryExtractor {
    fn name(&self) -> &str {
        "recovery"
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
        for (name, fields) in entries(tree, SECTIONS[0], ctx.delimiter, warnings) {
            let mut record = RecoveryRecord::named(name.strip_suffix("_Recovery").unwrap_or(name));
            for (strategy, node) in fields.map().iter() {
                match scalar_text(node) {
                    Some(action) => {
                        let action = action.trim();
                        if !action.is_empty() {
                            record.strategies.insert(strategy.to_string(), action.to_string());
                        }
                    }
                    None if matches!(node, Node::Null) => {}
                    None => warnings.push(FieldWarning::new(
                        fields.child_path(strategy),
                        "a string",
                        node,
                    )),
                }
            }
            out.push(Entity::Recovery(record));
        }
        out
    }
}
