use kbforge_dialect::{Mapping, Node};
use kbforge_shared::{CapabilityAlias, CommandRouteRecord, Entity};

use crate::fields::{FieldWarning, scalar_text};
use crate::routing::referenced_capabilities;
use crate::{EntityExtractor, ExtractContext};

const SECTIONS: &[&str] = &["Command_Integration"];

/// Top-level keys containing this are command groups too.
const COMMAND_GROUP_MARKER: &str = "_Commands";

/// Default capabilities per command.
///
/// `Command_Integration` may be flat (`command: usage`) or grouped
/// (`group: { command: usage }`); top-level `*_Commands` keys are groups.
/// Usage text is scanned for capability aliases. Commands whose usage names
/// no capability produce no record.
pub struct CommandRouteExtractor;

impl EntityExtractor for CommandRouteExtractor {
    fn name(&self) -> &str {
        "command route"
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
        let aliases = &ctx.routing.aliases;
        let mut out = Vec::new();

        for (key, node) in tree.iter() {
            if key == SECTIONS[0] {
                match node {
                    Node::Map(map) => {
                        for (entry, value) in map.iter() {
                            let path = format!("{key}.{entry}");
                            match value {
                                Node::Map(group) => route_group(group, &path, aliases, &mut out, warnings),
                                other => route_one(entry, other, &path, aliases, &mut out, warnings),
                            }
                        }
                    }
                    Node::Null => {}
                    other => warnings.push(FieldWarning::new(key, "a mapping", other)),
                }
            } else if key.contains(COMMAND_GROUP_MARKER) {
                match node {
                    Node::Map(group) => route_group(group, key, aliases, &mut out, warnings),
                    Node::Null => {}
                    other => warnings.push(FieldWarning::new(key, "a mapping", other)),
                }
            }
        }
        out
    }
}

fn route_group(
    group: &Mapping,
    path: &str,
    aliases: &[CapabilityAlias],
    out: &mut Vec<Entity>,
    warnings: &mut Vec<FieldWarning>,
) {
    for (command, usage) in group.iter() {
        let path = format!("{path}.{command}");
        route_one(command, usage, &path, aliases, out, warnings);
    }
}

fn route_one(
    command: &str,
    usage: &Node,
    path: &str,
    aliases: &[CapabilityAlias],
    out: &mut Vec<Entity>,
    warnings: &mut Vec<FieldWarning>,
) {
    let text = match usage {
        Node::Null => return,
        Node::Seq(items) => items.iter().filter_map(scalar_text).collect::<Vec<_>>().join(" "),
        other => match scalar_text(other) {
            Some(text) => text,
            None => {
                warnings.push(FieldWarning::new(path, "a usage string", other));
                return;
            }
        },
    };

    let capabilities = referenced_capabilities(&text, aliases);
    if !capabilities.is_empty() {
        out.push(Entity::CommandRoute(CommandRouteRecord {
            command: command.to_string(),
            capabilities,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::test_support::run;

    fn routes(entities: Vec<Entity>) -> Vec<(String, Vec<String>)> {
        entities
            .into_iter()
            .map(|e| match e {
                Entity::CommandRoute(r) => (r.command, r.capabilities),
                other => panic!("unexpected {:?}", other.kind()),
            })
            .collect()
    }

    fn owned(caps: &[&str]) -> Vec<String> {
        caps.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn nested_and_flat_integration() {
        let (entities, warnings) = run(
            &CommandRouteExtractor,
            r#"
Command_Integration:
  Development_Commands:
    build: "Magic for UI, C7 for frameworks"
    dev-setup: "native only"
  analyze: "--seq for deep analysis with Sequential"
"#,
        );
        assert!(warnings.is_empty());
        assert_eq!(
            routes(entities),
            vec![
                ("build".to_string(), owned(&["Magic", "Context7"])),
                ("analyze".to_string(), owned(&["Sequential"])),
            ]
        );
    }

    #[test]
    fn top_level_command_groups() {
        let (entities, _) = run(
            &CommandRouteExtractor,
            "Testing_Commands:\n  test: \"Puppeteer e2e\"\nOther:\n  x: \"Magic\"\n",
        );
        assert_eq!(routes(entities), vec![("test".to_string(), owned(&["Puppeteer"]))]);
    }

    #[test]
    fn wrong_shapes_warn() {
        let (entities, warnings) = run(
            &CommandRouteExtractor,
            "Command_Integration: just text\nAnalysis_Commands: [a]\n",
        );
        assert!(entities.is_empty());
        assert_eq!(warnings.len(), 2);
    }
}
