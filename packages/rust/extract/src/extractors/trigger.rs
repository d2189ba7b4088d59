use kbforge_dialect::Mapping;
use kbforge_shared::{Entity, TriggerRecord};

use crate::fields::{FieldWarning, entries, push_unique};
use crate::{EntityExtractor, ExtractContext};

const SECTIONS: &[&str] = &["Context_Detection_Patterns"];

/// Marker that makes a trigger's action mandatory.
const REQUIRED_MARKER: &str = "REQUIRED";

/// Automatic activation rules from `Context_Detection_Patterns`.
pub struct TriggerExtractor;

impl EntityExtractor for TriggerExtractor {
    fn name(&self) -> &str {
        "trigger"
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
            let mut record = TriggerRecord::named(name);

            record.patterns = fields.list("Triggers", warnings);
            for pattern in fields.list("Patterns", warnings) {
                push_unique(&mut record.patterns, pattern);
            }
            record.keywords = fields.list("Keywords", warnings);

            if let Some(action) = fields.scalar("Action", warnings) {
                record.required = Some(action.contains(REQUIRED_MARKER));
                record.action = Some(action);
            }

            out.push(Entity::Trigger(record));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::test_support::run;

    fn triggers(entities: Vec<Entity>) -> Vec<TriggerRecord> {
        entities
            .into_iter()
            .map(|e| match e {
                Entity::Trigger(t) => t,
                other => panic!("unexpected {:?}", other.kind()),
            })
            .collect()
    }

    #[test]
    fn action_sets_required_flag() {
        let (entities, warnings) = run(
            &TriggerExtractor,
            r#"
Context_Detection_Patterns:
  Library_Imports:
    Triggers: ["import .* from", "require\\("]
    Keywords: [docs, api]
    Action: "→ C7 lookup REQUIRED"
  Complex_Problems:
    Patterns: "debug | architecture"
    Action: "→ Sequential suggested"
  Bare: {}
"#,
        );
        assert!(warnings.is_empty());
        let found = triggers(entities);
        assert_eq!(found.len(), 3);

        assert_eq!(found[0].patterns, vec!["import .* from", "require\\("]);
        assert_eq!(found[0].keywords, vec!["docs", "api"]);
        assert_eq!(found[0].required, Some(true));

        assert_eq!(found[1].patterns, vec!["debug", "architecture"]);
        assert_eq!(found[1].required, Some(false));

        assert_eq!(found[2].action, None);
        assert_eq!(found[2].required, None);
    }
}
