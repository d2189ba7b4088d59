//! Recursive directory walk with deterministic ordering.

use std::path::{Path, PathBuf};

use kbforge_shared::{KbForgeError, Result};
use tracing::trace;

use crate::DiscoverOptions;

/// Collect matching files under `dir` into `out`, depth-first, sorted per directory.
///
/// Symlinked files are followed; symlinked directories are not.
pub(crate) fn walk_dir(dir: &Path, opts: &DiscoverOptions, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| KbForgeError::io(dir, e))?;

    let mut paths: Vec<(PathBuf, bool)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| KbForgeError::io(dir, e))?;
        let is_symlink = entry.file_type().is_ok_and(|t| t.is_symlink());
        paths.push((entry.path(), is_symlink));
    }
    paths.sort();

    for (path, is_symlink) in paths {
        if path.is_dir() {
            // Linked directories can loop back into the tree.
            if is_symlink {
                trace!(?path, "skipping symlinked directory");
                continue;
            }
            if is_excluded(&path, opts) {
                trace!(?path, "excluded directory");
                continue;
            }
            walk_dir(&path, opts, out)?;
        } else if has_document_extension(&path, opts) {
            out.push(path);
        }
    }

    Ok(())
}

fn is_excluded(path: &Path, opts: &DiscoverOptions) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| opts.exclude_dirs.iter().any(|d| d == name))
}

fn has_document_extension(path: &Path, opts: &DiscoverOptions) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            opts.extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
}
