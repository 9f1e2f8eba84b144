//! Version-control seam
//!
//! The committer only talks to these traits, so a scripted implementation can fail at any
//! step in tests.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("{} is not a git repository: {message}", path.display())]
    NotARepository { path: PathBuf, message: String },

    #[error("{} is outside the working copy {}", path.display(), workdir.display())]
    OutsideWorkingCopy { path: PathBuf, workdir: PathBuf },

    #[error("Failed to stage {}: {message}", path.display())]
    Stage { path: PathBuf, message: String },

    #[error("Failed to commit: {0}")]
    Commit(String),

    #[error("Push to '{remote}' failed: {message}")]
    Push { remote: String, message: String },
}

/// Opens working copies.
pub trait VersionControl: Send + Sync {
    fn open(&self, root: &Path) -> Result<Box<dyn VcsRepository>, VcsError>;
}

/// An open working copy.
pub trait VcsRepository: Send {
    /// Root of the working tree, `None` for bare repositories.
    fn workdir(&self) -> Option<PathBuf>;

    /// Add a path, relative to the working tree root, to the index.
    fn stage(&self, relative_path: &Path) -> Result<(), VcsError>;

    /// Reset a path's index entry to `HEAD`, dropping it when `HEAD` does not track it.
    fn unstage(&self, relative_path: &Path) -> Result<(), VcsError>;

    /// Commit the index to `HEAD` and return the new commit id.
    fn commit(&self, message: &str) -> Result<String, VcsError>;

    /// Push the current branch to the same branch on `remote`.
    fn push(&self, remote: &str) -> Result<(), VcsError>;
}
