//! Test fixtures: small encoded images and non-image payloads.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

fn encode(format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(8, 6, Rgb([220, 30, 30]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("Failed to encode fixture");
    out.into_inner()
}

pub fn red_png() -> Vec<u8> {
    encode(ImageFormat::Png)
}

pub fn red_jpeg() -> Vec<u8> {
    encode(ImageFormat::Jpeg)
}

/// TIFF is not served to browsers and gets converted on upload.
pub fn red_tiff() -> Vec<u8> {
    encode(ImageFormat::Tiff)
}

pub fn plain_text() -> Vec<u8> {
    b"definitely not an image\n".to_vec()
}
