//! Document discovery: turns an input tree into an ordered document list.
//!
//! Discovery order is the merge order downstream, so the walk is fully
//! deterministic: entries are visited in lexicographic path order, files and
//! sub-directories interleaved exactly as they sort.

mod walk;

use std::path::{Path, PathBuf};

use kbforge_shared::{DetectOptions, KbForgeError, Result, SourceDocument};
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// Discover options
// ---------------------------------------------------------------------------

/// Which files count as documents.
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// Extensions (without the dot), compared case-insensitively.
    pub extensions: Vec<String>,
    /// Directory names that are never descended into.
    pub exclude_dirs: Vec<String>,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self::from(&DetectOptions::default())
    }
}

impl From<&DetectOptions> for DiscoverOptions {
    fn from(opts: &DetectOptions) -> Self {
        Self {
            extensions: opts.extensions.clone(),
            exclude_dirs: opts.exclude_dirs.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry points
// ---------------------------------------------------------------------------

/// List every document under `root` in discovery order.
///
/// A `root` that is itself a file is returned as the single document, whatever
/// its extension. A missing or unreadable root is a hard error.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn discover_documents(root: &Path, opts: &DiscoverOptions) -> Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(root).map_err(|e| KbForgeError::io(root, e))?;

    if meta.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut documents = Vec::new();
    walk::walk_dir(root, opts, &mut documents)?;

    debug!(count = documents.len(), "documents discovered");
    Ok(documents)
}

/// Read one document from disk.
pub fn load_document(path: &Path) -> Result<SourceDocument> {
    let raw_text = std::fs::read_to_string(path).map_err(|e| KbForgeError::io(path, e))?;
    Ok(SourceDocument::new(path, raw_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, "Key: value\n").expect("write");
    }

    fn relative(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .expect("under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn discovers_in_sorted_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "b.yml");
        touch(dir.path(), "a.md");
        touch(dir.path(), "shared/z.yaml");
        touch(dir.path(), "shared/c.yml");
        touch(dir.path(), "notes.txt");

        let docs = discover_documents(dir.path(), &DiscoverOptions::default()).unwrap();
        assert_eq!(
            relative(dir.path(), &docs),
            vec!["a.md", "b.yml", "shared/c.yml", "shared/z.yaml"]
        );
    }

    #[test]
    fn hidden_directories_are_walked_but_excluded_ones_are_not() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), ".claude/shared/mcp.yml");
        touch(dir.path(), ".git/config.yml");
        touch(dir.path(), "node_modules/pkg/readme.md");

        let docs = discover_documents(dir.path(), &DiscoverOptions::default()).unwrap();
        assert_eq!(relative(dir.path(), &docs), vec![".claude/shared/mcp.yml"]);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "UPPER.YML");

        let docs = discover_documents(dir.path(), &DiscoverOptions::default()).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn file_root_is_single_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "only.yml");

        let root = dir.path().join("only.yml");
        let docs = discover_documents(&root, &DiscoverOptions::default()).unwrap();
        assert_eq!(docs, vec![root]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = discover_documents(&dir.path().join("nope"), &DiscoverOptions::default());
        assert!(matches!(result, Err(KbForgeError::Io { .. })));
    }

    #[test]
    fn load_document_reads_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "doc.yml");

        let doc = load_document(&dir.path().join("doc.yml")).unwrap();
        assert_eq!(doc.raw_text, "Key: value\n");
        assert!(doc.path.ends_with("doc.yml"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "a.yml");
        touch(dir.path(), "real/b.yml");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("a.yml"), dir.path().join("linked.yml")).unwrap();

        let docs = discover_documents(dir.path(), &DiscoverOptions::default()).unwrap();
        assert_eq!(
            relative(dir.path(), &docs),
            vec!["a.yml", "linked.yml", "real/b.yml"]
        );
    }
}
