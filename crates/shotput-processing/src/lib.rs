//! Shotput image processing
//!
//! Turns an untrusted upload into a [`NormalizedImage`]: the payload is sniffed, decoded to
//! prove it is an image, and re-encoded to PNG when its format is not web-safe.

pub mod content_type;
pub mod format;
#[cfg(feature = "heif")]
mod heif;
pub mod normalizer;

pub use content_type::{extension_for_content_type, normalize_content_type};
pub use format::SourceFormat;
pub use normalizer::{normalize, normalize_blocking, NormalizeError, NormalizedImage};
