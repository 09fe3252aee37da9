//! Repository root and source file discovery.

use std::path::{Path, PathBuf};

use dox_source::Source;
use ignore::WalkBuilder;

use crate::error::PublishError;

/// Directories never searched for sources.
const SKIPPED_DIRS: &[&str] = &["vendor"];

/// Nearest ancestor of `start` (inclusive) containing a `.git` entry.
///
/// `.git` may be a file, as in worktrees and submodules.
pub fn find_repo_root(start: &Path) -> Result<PathBuf, PublishError> {
    let start = start
        .canonicalize()
        .map_err(|e| PublishError::io(start, e))?;

    let found = start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf);
    found.ok_or(PublishError::RepoRootNotFound(start))
}

/// Source files under `repo_root`, sorted by path.
///
/// Honors `.gitignore` and skips hidden entries and vendored code.
pub fn find_sources(repo_root: &Path) -> Result<Vec<PathBuf>, PublishError> {
    let walker = WalkBuilder::new(repo_root)
        .hidden(true)
        .git_ignore(true)
        .require_git(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && SKIPPED_DIRS.iter().any(|skip| entry.file_name() == *skip))
        })
        .build();

    let mut sources = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_some_and(|t| t.is_file()) && Source::matches(entry.path()) {
            sources.push(entry.into_path());
        }
    }
    sources.sort();

    tracing::info!(
        root = %repo_root.display(),
        count = sources.len(),
        "Discovered source files"
    );
    Ok(sources)
}
