//! Fenced-block parser: structured fragments inside a free-form document.

use tracing::debug;

use crate::strict::parse_strict;
use crate::tree::Mapping;

/// Outcome of scanning a document for fenced blocks.
#[derive(Debug, Clone, Default)]
pub struct FencedParse {
    /// Shallow merge of every block that parsed to a non-empty mapping.
    pub tree: Mapping,
    /// Blocks that contributed to `tree`.
    pub parsed_blocks: usize,
    /// Blocks that were found but did not parse.
    pub failed_blocks: usize,
}

/// Collect and parse every fenced block tagged with one of `tags`.
///
/// A block opens on a line that is exactly ```` ```<tag> ```` (surrounding
/// whitespace ignored) and closes on a line that is exactly ```` ``` ````.
/// Later blocks win on top-level key collisions. A block still open at end of
/// input is ignored.
pub fn parse_fenced(text: &str, tags: &[String]) -> FencedParse {
    let mut result = FencedParse::default();
    let mut block: Option<Vec<&str>> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        match block.as_mut() {
            None => {
                if is_opening_fence(trimmed, tags) {
                    block = Some(Vec::new());
                }
            }
            Some(lines) => {
                if trimmed == "```" {
                    let interior = lines.join("\n");
                    block = None;
                    match parse_strict(&interior) {
                        Ok(tree) if !tree.is_empty() => {
                            result.tree.extend_from(tree);
                            result.parsed_blocks += 1;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            debug!(error = %e, "fenced block did not parse");
                            result.failed_blocks += 1;
                        }
                    }
                } else {
                    lines.push(line);
                }
            }
        }
    }

    result
}

fn is_opening_fence(trimmed: &str, tags: &[String]) -> bool {
    trimmed
        .strip_prefix("```")
        .is_some_and(|tag| tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
}
