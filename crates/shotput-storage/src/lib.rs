//! Shotput Storage Library
//!
//! Durable storage for uploaded artifacts and the provenance trail that records them.
//!
//! - [`store`]: writes artifacts into `images_repo_path/image_sub_dir`, atomically and
//!   without ever overwriting an existing file.
//! - [`vcs`]: the version-control seam (`open`, `stage`, `commit`, `push`).
//! - [`git`]: the `git2` implementation of that seam.
//! - [`committer`]: turns a written artifact into a [`CommitOutcome`](shotput_core::CommitOutcome).

pub mod committer;
pub mod git;
pub mod store;
#[cfg(test)]
mod testing;
pub mod vcs;

// Re-export commonly used types
pub use committer::{commit_message, ProvenanceCommitter};
pub use git::GitVersionControl;
pub use store::{ArtifactStore, LocalArtifactStore, StoreError, StoreResult};
pub use vcs::{VcsError, VcsRepository, VersionControl};
