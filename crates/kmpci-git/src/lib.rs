//! kmpci Git - changed-file discovery
//!
//! This crate answers one question for the rest of kmpci: which files
//! differ between a base reference and `HEAD`.

mod diff;
mod repository;

pub use diff::changed_files_since;
pub use repository::{repo_root, GitRepo, Result};
