//! Capability name resolution from free text.

use kbforge_shared::{CapabilityAlias, WorkflowHint};

use crate::fields::push_unique;

/// Capabilities referenced in `text`, in alias-rule order, without repeats.
pub fn referenced_capabilities(text: &str, aliases: &[CapabilityAlias]) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();
    for alias in aliases {
        if alias
            .patterns
            .iter()
            .any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
        {
            push_unique(&mut found, alias.capability.clone());
        }
    }
    found
}

/// Owning capability implied by a workflow's name. First matching hint wins.
pub fn infer_capability(workflow_name: &str, hints: &[WorkflowHint]) -> Option<String> {
    let lower = workflow_name.to_lowercase();
    hints
        .iter()
        .find(|hint| {
            hint.keywords
                .iter()
                .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
        })
        .map(|hint| hint.capability.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbforge_shared::RoutingConfig;

    #[test]
    fn aliases_match_case_insensitively_in_rule_order() {
        let routing = RoutingConfig::default();
        let found = referenced_capabilities(
            "Use Sequential for planning, then C7 docs, then MAGIC; context7 again",
            &routing.aliases,
        );
        assert_eq!(found, vec!["Magic", "Context7", "Sequential"]);
    }

    #[test]
    fn no_alias_yields_empty() {
        let routing = RoutingConfig::default();
        assert!(referenced_capabilities("native tools only", &routing.aliases).is_empty());
    }

    #[test]
    fn workflow_hints_follow_order() {
        let routing = RoutingConfig::default();
        let hints = &routing.workflow_hints;
        assert_eq!(infer_capability("Library_Research", hints).as_deref(), Some("Context7"));
        assert_eq!(infer_capability("Complex_Analysis", hints).as_deref(), Some("Sequential"));
        assert_eq!(infer_capability("UI_Component_Build", hints).as_deref(), Some("Magic"));
        assert_eq!(infer_capability("Browser_Testing", hints).as_deref(), Some("Puppeteer"));
        assert_eq!(infer_capability("Deploy", hints), None);
    }
}
