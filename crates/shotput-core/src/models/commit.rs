use std::fmt;

/// Why a local commit was not followed by a successful push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushStatus {
    /// Auto-push is disabled in the configuration.
    NotAttempted,
    /// The push was attempted and failed (network, auth, rejection or timeout).
    Failed(String),
}

/// Result of recording an artifact in version-control history.
///
/// Only [`CommitOutcome::Failed`] requires the caller to undo the artifact write; a local
/// commit that could not be pushed is a degraded success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Pushed {
        commit_id: String,
        message: String,
    },
    LocalOnly {
        commit_id: String,
        push: PushStatus,
        message: String,
    },
    Failed {
        message: String,
    },
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        !matches!(self, CommitOutcome::Failed { .. })
    }

    pub fn pushed(&self) -> bool {
        matches!(self, CommitOutcome::Pushed { .. })
    }

    pub fn commit_id(&self) -> Option<&str> {
        match self {
            CommitOutcome::Pushed { commit_id, .. }
            | CommitOutcome::LocalOnly { commit_id, .. } => Some(commit_id),
            CommitOutcome::Failed { .. } => None,
        }
    }

    /// Human-readable diagnostic for logs and responses.
    pub fn diagnostic(&self) -> &str {
        match self {
            CommitOutcome::Pushed { message, .. }
            | CommitOutcome::LocalOnly { message, .. }
            | CommitOutcome::Failed { message } => message,
        }
    }

    /// Warning to attach to a successful upload when the push failed.
    pub fn push_warning(&self) -> Option<&str> {
        match self {
            CommitOutcome::LocalOnly {
                push: PushStatus::Failed(_),
                message,
                ..
            } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for CommitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            CommitOutcome::Pushed { .. } => "committed and pushed",
            CommitOutcome::LocalOnly { .. } => "committed locally",
            CommitOutcome::Failed { .. } => "commit failed",
        };
        write!(f, "{}: {}", kind, self.diagnostic())
    }
}
