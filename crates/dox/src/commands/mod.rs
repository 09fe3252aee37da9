//! CLI command implementations.

pub(crate) mod list;
pub(crate) mod publish;

use std::path::{Path, PathBuf};

use dox_publish::find_repo_root;

pub(crate) use list::ListArgs;
pub(crate) use publish::PublishArgs;

use crate::error::CliError;

/// Repository root containing `repo`, or the current directory.
fn resolve_repo_root(repo: Option<&Path>) -> Result<PathBuf, CliError> {
    let start = match repo {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    Ok(find_repo_root(&start)?)
}
