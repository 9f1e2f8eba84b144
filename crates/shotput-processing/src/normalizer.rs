//! Upload normalization
//!
//! The extension of a [`NormalizedImage`] always describes the bytes it carries: it is
//! derived from the sniffed format, and the client-declared content type only has to agree
//! with the small allow-list in [`crate::content_type`].

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use crate::content_type::{
    extension_for_content_type, is_image_content_type, normalize_content_type,
    NORMALIZED_EXTENSION,
};
use crate::format::SourceFormat;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("unsupported content type '{0}', expected image/*")]
    NotAnImage(String),

    #[error("empty file")]
    Empty,

    #[error("unrecognized image format")]
    UnknownFormat,

    #[error("failed to decode {format} image: {message}")]
    Decode { format: String, message: String },

    #[error("{0} images are not supported by this server")]
    UnsupportedFormat(String),

    #[error("failed to re-encode image as PNG: {0}")]
    Encode(String),

    #[error("image processing task failed: {0}")]
    Task(String),
}

impl NormalizeError {
    /// Whether the upload itself is at fault (as opposed to the server).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, NormalizeError::Encode(_) | NormalizeError::Task(_))
    }
}

/// An upload proven to be an image, ready to be stored.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Format the client actually sent.
    pub source_format: SourceFormat,
    /// Bytes to store: the original payload, or the PNG re-encoding.
    pub bytes: Vec<u8>,
    /// Extension matching `bytes`, without the leading dot.
    pub extension: &'static str,
    pub width: u32,
    pub height: u32,
    pub converted: bool,
}

/// Validate and, if needed, re-encode an upload. CPU-bound; see [`normalize_blocking`].
pub fn normalize(
    bytes: Vec<u8>,
    declared_content_type: &str,
) -> Result<NormalizedImage, NormalizeError> {
    let content_type = normalize_content_type(declared_content_type);
    if !is_image_content_type(&content_type) {
        return Err(NormalizeError::NotAnImage(content_type));
    }
    if bytes.is_empty() {
        return Err(NormalizeError::Empty);
    }

    let source_format = SourceFormat::sniff(&bytes).ok_or(NormalizeError::UnknownFormat)?;
    let image = decode(&bytes, source_format)?;
    let (width, height) = image.dimensions();

    match source_format.web_extension() {
        Some(sniffed) => {
            let extension = match extension_for_content_type(&content_type) {
                Some(declared) if declared == sniffed => declared,
                Some(declared) => {
                    tracing::warn!(
                        content_type = %content_type,
                        declared_extension = declared,
                        actual_format = %source_format,
                        "Declared content type does not match image data, using actual format"
                    );
                    sniffed
                }
                None => {
                    tracing::debug!(
                        content_type = %content_type,
                        actual_format = %source_format,
                        "Declared content type not in extension table, using actual format"
                    );
                    sniffed
                }
            };

            Ok(NormalizedImage {
                source_format,
                bytes,
                extension,
                width,
                height,
                converted: false,
            })
        }
        None => {
            let png = encode_png(image)?;
            tracing::info!(
                from = %source_format,
                width = width,
                height = height,
                original_size = bytes.len(),
                converted_size = png.len(),
                "Converted image to PNG"
            );

            Ok(NormalizedImage {
                source_format,
                bytes: png,
                extension: NORMALIZED_EXTENSION,
                width,
                height,
                converted: true,
            })
        }
    }
}

/// [`normalize`] on the blocking thread pool.
pub async fn normalize_blocking(
    bytes: Vec<u8>,
    declared_content_type: String,
) -> Result<NormalizedImage, NormalizeError> {
    tokio::task::spawn_blocking(move || normalize(bytes, &declared_content_type))
        .await
        .map_err(|e| NormalizeError::Task(e.to_string()))?
}

fn decode(bytes: &[u8], format: SourceFormat) -> Result<DynamicImage, NormalizeError> {
    if format == SourceFormat::Heif {
        return decode_heif(bytes);
    }

    let image_format = format
        .image_format()
        .ok_or_else(|| NormalizeError::UnsupportedFormat(format.to_string()))?;

    ImageReader::with_format(Cursor::new(bytes), image_format)
        .decode()
        .map_err(|e| match e {
            image::ImageError::Unsupported(_) => {
                NormalizeError::UnsupportedFormat(format.to_string())
            }
            other => NormalizeError::Decode {
                format: format.to_string(),
                message: other.to_string(),
            },
        })
}

#[cfg(feature = "heif")]
fn decode_heif(bytes: &[u8]) -> Result<DynamicImage, NormalizeError> {
    crate::heif::decode(bytes)
}

#[cfg(not(feature = "heif"))]
fn decode_heif(_bytes: &[u8]) -> Result<DynamicImage, NormalizeError> {
    Err(NormalizeError::UnsupportedFormat(SourceFormat::Heif.to_string()))
}

fn encode_png(image: DynamicImage) -> Result<Vec<u8>, NormalizeError> {
    // PNG has no float pixel types.
    let image = match image {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba16(image.to_rgba16())
        }
        other => other,
    };

    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| NormalizeError::Encode(e.to_string()))?;
    Ok(buffer)
}
