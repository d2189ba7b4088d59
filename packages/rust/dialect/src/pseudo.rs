//! Pseudo-header parser: prose headers stand in for top-level keys.
//!
//! `## Name` starts a section and becomes `Name:`. Lines inside a section are
//! shifted right by one indent unit so they nest under that key; sections
//! listed as passthrough already carry their own indentation and are copied
//! verbatim. Anything before the first header is preamble and is dropped.

use kbforge_shared::{KbForgeError, Result};

use crate::strict::parse_strict;
use crate::tree::Mapping;

/// Indent unit applied to regular section content.
const INDENT_UNIT: &str = "  ";

/// Rebuild a parseable document from a header-structured one.
///
/// Returns `None` when the text has no `## ` header at all.
pub fn reconstruct(text: &str, passthrough_sections: &[String]) -> Option<String> {
    let mut out: Vec<String> = Vec::new();
    let mut indent: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(name) = header_name(trimmed) {
            out.push(format!("{name}:"));
            let passthrough = passthrough_sections.iter().any(|s| s == name);
            indent = Some(if passthrough { "" } else { INDENT_UNIT });
            continue;
        }

        let Some(indent) = indent else {
            continue;
        };

        if trimmed.is_empty() {
            out.push(String::new());
        } else if trimmed.starts_with("```") {
            // Fence markers are decoration here; the content between them stays.
            continue;
        } else {
            out.push(format!("{indent}{line}"));
        }
    }

    if out.is_empty() {
        return None;
    }

    Some(out.join("\n"))
}

/// Reconstruct and strictly parse a header-structured document.
pub fn parse_pseudo(text: &str, passthrough_sections: &[String]) -> Result<Mapping> {
    let rebuilt = reconstruct(text, passthrough_sections)
        .ok_or_else(|| KbForgeError::parse("no `## ` section headers found"))?;

    parse_strict(&rebuilt)
        .map_err(|e| KbForgeError::parse(format!("reconstructed document did not parse: {e}")))
}

/// True when any column-0 line is a `## Name` section header.
///
/// YAML reads such lines as comments, so a header-structured document can
/// also pass a whole-text strict parse with its section keys missing.
pub fn has_section_headers(text: &str) -> bool {
    text.lines()
        .any(|line| line.starts_with("## ") && header_name(line).is_some())
}

/// `## Name` → `Name`. Deeper headings and bare `##` are not section headers.
fn header_name(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix("## ")?;
    let name = rest.trim().trim_end_matches(':').trim_end();
    if name.is_empty() { None } else { Some(name) }
}
