//! HEIC/HEIF decoding through libheif

use image::{DynamicImage, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

use crate::normalizer::NormalizeError;

pub(crate) fn decode(bytes: &[u8]) -> Result<DynamicImage, NormalizeError> {
    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(bytes).map_err(decode_error)?;
    let handle = ctx.primary_image_handle().map_err(decode_error)?;
    let image = lib
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
        .map_err(decode_error)?;

    let planes = image.planes();
    let plane = planes.interleaved.ok_or_else(|| NormalizeError::Decode {
        format: "HEIC/HEIF".to_string(),
        message: "decoded image has no interleaved RGBA plane".to_string(),
    })?;

    let width = plane.width;
    let height = plane.height;
    let row_len = width as usize * 4;

    // Rows may be padded; copy them out without the stride padding.
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len.min(row.len())]);
    }

    RgbaImage::from_raw(width, height, pixels)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| NormalizeError::Decode {
            format: "HEIC/HEIF".to_string(),
            message: "decoded buffer does not match image dimensions".to_string(),
        })
}

fn decode_error(err: libheif_rs::HeifError) -> NormalizeError {
    NormalizeError::Decode {
        format: "HEIC/HEIF".to_string(),
        message: err.to_string(),
    }
}
