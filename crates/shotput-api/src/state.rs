//! Application state shared by all handlers.

use std::sync::Arc;

use shotput_core::RepositoryConfig;
use shotput_storage::{ArtifactStore, ProvenanceCommitter};
use tokio::sync::Mutex;

pub struct AppState {
    pub config: RepositoryConfig,
    pub store: Arc<dyn ArtifactStore>,
    pub committer: ProvenanceCommitter,
    /// Serializes every mutation of the working copy: write, stage, commit, push, cleanup.
    pub working_copy_lock: Mutex<()>,
    /// Error responses carry server-side details; off in production.
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(
        config: RepositoryConfig,
        store: Arc<dyn ArtifactStore>,
        committer: ProvenanceCommitter,
        expose_error_details: bool,
    ) -> Self {
        Self {
            config,
            store,
            committer,
            working_copy_lock: Mutex::new(()),
            expose_error_details,
        }
    }
}
