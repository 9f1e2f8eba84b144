//! Shotput API Library
//!
//! This crate provides the HTTP surface of the upload-commit-publish pipeline: routes,
//! handlers, the pipeline service, application state and setup.

// Module declarations
mod api_doc;
mod handlers;
pub mod services;
pub mod setup;
pub mod telemetry;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
