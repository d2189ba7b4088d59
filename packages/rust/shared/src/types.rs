//! Document-level domain types shared by every stage of a detection pass.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SourceDocument
// ---------------------------------------------------------------------------

/// One loaded input document. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Where the document was read from.
    pub path: PathBuf,
    /// Raw file contents.
    pub raw_text: String,
}

impl SourceDocument {
    /// Build a document from an in-memory path/text pair.
    pub fn new(path: impl Into<PathBuf>, raw_text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Directory used to resolve relative include paths.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

// ---------------------------------------------------------------------------
// IncludeDirective
// ---------------------------------------------------------------------------

/// An `@include <path>[#<section>]` directive found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeDirective {
    /// Referenced file, relative to the including document's directory.
    pub target_path: PathBuf,
    /// Optional top-level section to cut out of the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// 1-based line number of the directive.
    pub occurrence_line: usize,
}

// ---------------------------------------------------------------------------
// DetectionError
// ---------------------------------------------------------------------------

/// Pipeline stage at which a non-fatal problem was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The document itself could not be read.
    Read,
    /// An include directive could not be satisfied.
    Include,
    /// No dialect parser could make sense of the document.
    Parse,
    /// A field had an unexpected shape during entity extraction.
    Extract,
    /// The worker processing the document panicked or was cancelled.
    Worker,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Read => "read",
            Self::Include => "include",
            Self::Parse => "parse",
            Self::Extract => "extract",
            Self::Worker => "worker",
        };
        f.write_str(label)
    }
}

/// A non-fatal problem recorded during detection.
///
/// These accumulate in document order next to the knowledge base; callers
/// decide whether the result is complete enough to act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionError {
    /// Document the problem belongs to.
    pub document_path: PathBuf,
    /// Stage that recorded it.
    pub stage: Stage,
    /// Human-readable description.
    pub message: String,
}

impl DetectionError {
    pub fn new(document_path: impl Into<PathBuf>, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            document_path: document_path.into(),
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.document_path.display(),
            self.stage,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dir_of_nested_document() {
        let doc = SourceDocument::new("docs/shared/mcp.yml", "");
        assert_eq!(doc.base_dir(), Path::new("docs/shared"));
    }

    #[test]
    fn base_dir_of_bare_file_name_is_empty() {
        let doc = SourceDocument::new("mcp.yml", "");
        assert_eq!(doc.base_dir(), Path::new(""));
    }

    #[test]
    fn detection_error_display() {
        let err = DetectionError::new("a/b.yml", Stage::Include, "missing.yml not found");
        assert_eq!(err.to_string(), "a/b.yml [include]: missing.yml not found");
    }

    #[test]
    fn stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::Extract).expect("serialize");
        assert_eq!(json, "\"extract\"");
    }
}
