use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generated name of a stored artifact: `<timestamp>_<disambiguator>.<extension>`.
///
/// The timestamp prefix makes names sort by creation time; the disambiguator separates
/// uploads made within the same second.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactIdentity {
    /// Local time, `%Y%m%d%H%M%S`.
    pub timestamp: String,
    /// 8 lowercase hex characters.
    pub disambiguator: String,
    /// Extension without the leading dot.
    pub extension: String,
}

impl ArtifactIdentity {
    pub fn new(
        timestamp: impl Into<String>,
        disambiguator: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            disambiguator: disambiguator.into(),
            extension: extension.into(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}.{}", self.timestamp, self.disambiguator, self.extension)
    }
}

impl fmt::Display for ArtifactIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}.{}", self.timestamp, self.disambiguator, self.extension)
    }
}

/// Whether the CDN address of an artifact is expected to resolve yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    /// The commit reached the remote.
    Live,
    /// The commit exists only locally (push disabled or failed).
    Pending,
}

/// Final, externally reachable description of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub identity: ArtifactIdentity,
    pub cdn_url: String,
    /// Embeddable markdown image reference.
    pub markdown: String,
    pub status: PublicationStatus,
}

impl PublishedArtifact {
    pub fn image_name(&self) -> String {
        self.identity.file_name()
    }

    /// Set the publication status from the outcome of the provenance commit.
    pub fn published_by(mut self, outcome: &crate::models::CommitOutcome) -> Self {
        self.status = if outcome.pushed() {
            PublicationStatus::Live
        } else {
            PublicationStatus::Pending
        };
        self
    }
}
