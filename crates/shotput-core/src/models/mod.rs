//! Data models for the upload pipeline
//!
//! Every model here is ephemeral: built while a single upload is processed and dropped
//! once the response is sent.

mod artifact;
mod commit;
mod upload;

pub use artifact::*;
pub use commit::*;
pub use upload::*;
