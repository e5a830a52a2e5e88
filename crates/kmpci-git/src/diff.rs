//! Changed-file discovery between a base reference and `HEAD`

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use kmpci_core::error::GitError;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Paths that differ between the merge base of `base` and `HEAD`.
    ///
    /// This is `git diff --name-only <base>...HEAD`: added, modified and
    /// deleted files, relative to the repository root with `/` separators.
    /// Renames are reported as a deletion plus an addition.
    pub fn changed_files(&self, base: &str) -> Result<Vec<String>> {
        let base_commit = self
            .repo
            .revparse_single(base)
            .map_err(|_| GitError::UnknownRef(base.to_string()))?
            .peel_to_commit()?;
        let head = self.head_commit()?;

        let merge_base = self
            .repo
            .merge_base(base_commit.id(), head.id())
            .map_err(|e| {
                if e.code() == git2::ErrorCode::NotFound {
                    GitError::NoMergeBase {
                        base: base.to_string(),
                    }
                } else {
                    GitError::Git2(e)
                }
            })?;
        debug!(base, merge_base = %merge_base, head = %head.id(), "diffing against merge base");

        let base_tree = self.repo.find_commit(merge_base)?.tree()?;
        let head_tree = head.tree()?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)?;

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for delta in diff.deltas() {
            for file in [delta.old_file(), delta.new_file()] {
                if let Some(path) = file.path() {
                    let path = path.to_string_lossy().replace('\\', "/");
                    if seen.insert(path.clone()) {
                        files.push(path);
                    }
                }
            }
        }

        info!(base, count = files.len(), "found changed files");
        Ok(files)
    }
}

/// Changed files for the repository containing `dir`.
///
/// Any failure (no repository, unknown base, unrelated histories) is logged
/// and treated as "no changes", which callers turn into a full build.
pub fn changed_files_since(dir: &Path, base: &str) -> Vec<String> {
    let result = GitRepo::discover(dir).and_then(|repo| repo.changed_files(base));
    match result {
        Ok(files) => files,
        Err(e) => {
            warn!(base, error = %e, "could not compute changed files");
            Vec::new()
        }
    }
}
