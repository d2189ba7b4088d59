//! `@include <path>[#<section>]` expansion.
//!
//! Expansion is a textual splice performed before any parser sees the
//! document. It is single-pass: directives inside spliced content are left
//! as plain text.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use kbforge_shared::{DetectionError, IncludeDirective, KbForgeError, SourceDocument, Stage};
use regex::Regex;
use tracing::{debug, warn};

static INCLUDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@include\s+([^\s#]+)(?:#(\S+))?").expect("include directive regex")
});

/// Result of expanding one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncludeResolution {
    /// The expanded text.
    pub text: String,
    /// Every directive found, in document order.
    pub directives: Vec<IncludeDirective>,
    /// One entry per directive that could not be satisfied.
    pub errors: Vec<DetectionError>,
}

/// Expand every include directive in `doc`, resolving paths against `base_dir`.
///
/// A directive replaces its whole line. Failures leave a `# ...` marker line
/// in place and record an [`Stage::Include`] error; the remaining directives
/// are still expanded.
pub fn resolve(doc: &SourceDocument, base_dir: &Path) -> IncludeResolution {
    let mut resolution = IncludeResolution::default();
    let mut lines = Vec::new();

    for (index, line) in doc.raw_text.split('\n').enumerate() {
        let Some(caps) = INCLUDE_RE.captures(line) else {
            lines.push(line.to_string());
            continue;
        };

        let directive = IncludeDirective {
            target_path: PathBuf::from(&caps[1]),
            section: caps.get(2).map(|m| m.as_str().to_string()),
            occurrence_line: index + 1,
        };
        debug!(
            document = %doc.path.display(),
            target = %directive.target_path.display(),
            section = ?directive.section,
            line = directive.occurrence_line,
            "expanding include"
        );

        let replacement = match splice(&directive, base_dir) {
            Ok(text) => text,
            Err((marker, err)) => {
                let error = DetectionError::new(&doc.path, Stage::Include, err.to_string());
                warn!(%error, "include not satisfied");
                resolution.errors.push(error);
                marker
            }
        };

        lines.push(replacement);
        resolution.directives.push(directive);
    }

    resolution.text = lines.join("\n");
    resolution
}

/// Produce the replacement text for one directive, or a marker line and the
/// reason.
fn splice(
    directive: &IncludeDirective,
    base_dir: &Path,
) -> Result<String, (String, KbForgeError)> {
    let target = base_dir.join(&directive.target_path);
    let shown = directive.target_path.display();

    let content = std::fs::read_to_string(&target).map_err(|e| {
        (
            format!("# Error including {shown}: {e}"),
            KbForgeError::io(&target, e),
        )
    })?;

    match &directive.section {
        None => Ok(content.trim_end_matches(['\n', '\r']).to_string()),
        Some(section) => extract_section(&content, section).ok_or_else(|| {
            (
                format!("# Section {section} not found in {shown}"),
                KbForgeError::include(format!(
                    "section '{section}' not found in {}",
                    target.display()
                )),
            )
        }),
    }
}

/// Cut one top-level section out of `content`.
///
/// The section starts at the first column-0 line beginning with `<section>:`
/// and runs until the next column-0 line that looks like a key, or end of
/// input. Every line in between is kept, blank ones included. Returns `None`
/// if the header is never found.
pub fn extract_section(content: &str, section: &str) -> Option<String> {
    let header = format!("{section}:");
    let mut lines = content.lines();

    let first = lines.by_ref().find(|line| line.starts_with(&header))?;
    let mut collected = vec![first];
    collected.extend(lines.take_while(|line| !starts_top_level_key(line)));

    Some(collected.join("\n"))
}

fn starts_top_level_key(line: &str) -> bool {
    line.chars().next().is_some_and(|c| !c.is_whitespace()) && line.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn doc_in(dir: &TempDir, text: &str) -> SourceDocument {
        SourceDocument::new(dir.path().join("main.md"), text)
    }

    #[test]
    fn splices_whole_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("shared.yml"), "Servers:\n  Core:\n    Purpose: indexing\n\n").unwrap();
        let doc = doc_in(&dir, "before\n@include shared.yml\nafter");

        let out = resolve(&doc, doc.base_dir());
        assert_eq!(out.text, "before\nServers:\n  Core:\n    Purpose: indexing\nafter");
        assert!(out.errors.is_empty());
        assert_eq!(out.directives.len(), 1);
        assert_eq!(out.directives[0].occurrence_line, 2);
        assert_eq!(out.directives[0].section, None);
    }

    #[test]
    fn missing_file_leaves_marker_and_error() {
        let dir = TempDir::new().unwrap();
        let doc = doc_in(&dir, "top: 1\n@include nowhere.yml\nbottom: 2");

        let out = resolve(&doc, doc.base_dir());
        let lines: Vec<_> = out.text.lines().collect();
        assert_eq!(lines[0], "top: 1");
        assert!(lines[1].starts_with("# Error including nowhere.yml:"));
        assert_eq!(lines[2], "bottom: 2");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].stage, Stage::Include);
        assert_eq!(out.errors[0].document_path, doc.path);
    }

    #[test]
    fn sibling_directives_survive_a_failure() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ok.yml"), "Token_Economics:\n  Budget_Allocation: tight").unwrap();
        let doc = doc_in(&dir, "@include missing.yml\n@include ok.yml");

        let out = resolve(&doc, doc.base_dir());
        assert_eq!(out.errors.len(), 1);
        assert!(out.text.ends_with("Token_Economics:\n  Budget_Allocation: tight"));
        assert_eq!(out.directives.len(), 2);
    }

    #[test]
    fn section_include_cuts_exact_block() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("multi.yml"),
            "Preamble: x\nAlpha:\n  one: 1\n  nested:\n    two: 2\nBeta:\n  three: 3\n",
        )
        .unwrap();
        let doc = doc_in(&dir, "@include multi.yml#Alpha");

        let out = resolve(&doc, doc.base_dir());
        assert_eq!(out.text, "Alpha:\n  one: 1\n  nested:\n    two: 2");
        assert_eq!(out.directives[0].section.as_deref(), Some("Alpha"));
    }

    #[test]
    fn section_not_found_is_recorded() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("multi.yml"), "Alpha:\n  one: 1\n").unwrap();
        let doc = doc_in(&dir, "@include multi.yml#Gamma");

        let out = resolve(&doc, doc.base_dir());
        assert_eq!(out.text, "# Section Gamma not found in multi.yml");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.contains("Gamma"));
    }

    #[test]
    fn included_directives_are_not_reexpanded() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("inner.yml"), "leaf: value").unwrap();
        fs::write(dir.path().join("outer.yml"), "@include inner.yml").unwrap();
        let doc = doc_in(&dir, "@include outer.yml");

        let out = resolve(&doc, doc.base_dir());
        assert_eq!(out.text, "@include inner.yml");
        assert_eq!(out.directives.len(), 1);
        assert!(out.errors.is_empty());
    }

    #[test]
    fn text_without_directives_is_untouched() {
        let doc = SourceDocument::new("plain.md", "a: 1\r\n\nb: 2\n");
        let out = resolve(&doc, Path::new("."));
        assert_eq!(out.text, doc.raw_text);
        assert!(out.directives.is_empty());
    }

    #[test]
    fn extract_section_edges() {
        let content = "Alpha:\n  a: 1\n\n  b: 2\n\nBeta:\n  c: 3";
        assert_eq!(extract_section(content, "Alpha").as_deref(), Some("Alpha:\n  a: 1\n\n  b: 2\n"));
        assert_eq!(extract_section(content, "Beta").as_deref(), Some("Beta:\n  c: 3"));
        // Indented occurrences are not section headers.
        assert_eq!(extract_section("Outer:\n  Alpha:\n    x: 1", "Alpha"), None);
        assert_eq!(extract_section("", "Alpha"), None);
    }
}
