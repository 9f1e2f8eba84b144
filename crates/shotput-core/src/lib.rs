//! Shotput Core Library
//!
//! This crate provides the domain models, error types, configuration, artifact naming and
//! CDN address resolution shared by every Shotput component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod naming;
pub mod publication;

// Re-export commonly used types
pub use config::{
    CdnIdentity, Config, ConfigDiagnostic, ConfigResolver, ConfigSource, RepositoryConfig,
    ResolvedConfig, ServerConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    ArtifactIdentity, CommitOutcome, HealthResponse, PublicationStatus, PublishedArtifact,
    PushStatus, UploadImageResponse,
};
pub use naming::{generate_name, generate_name_at};
pub use publication::resolve_url;
