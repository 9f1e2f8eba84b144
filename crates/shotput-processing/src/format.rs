//! Format sniffing

use std::fmt;

use image::ImageFormat;

/// ISO-BMFF `ftyp` major brands used by HEIC/HEIF files.
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"hevm", b"hevs", b"mif1", b"msf1",
];

/// Actual format of an uploaded payload, as determined from its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Heif,
    Tiff,
    /// Any other raster format the `image` crate recognizes (BMP, ICO, ...).
    Other(ImageFormat),
}

impl SourceFormat {
    /// Identify the format from magic bytes. `None` when nothing matches.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if is_heif(bytes) {
            return Some(SourceFormat::Heif);
        }
        image::guess_format(bytes).ok().map(Self::from)
    }

    /// Web-safe formats pass through unchanged; everything else is re-encoded.
    pub fn needs_normalization(&self) -> bool {
        self.web_extension().is_none()
    }

    /// Extension for web-safe formats.
    pub fn web_extension(&self) -> Option<&'static str> {
        match self {
            SourceFormat::Png => Some("png"),
            SourceFormat::Jpeg => Some("jpg"),
            SourceFormat::Gif => Some("gif"),
            SourceFormat::WebP => Some("webp"),
            SourceFormat::Heif | SourceFormat::Tiff | SourceFormat::Other(_) => None,
        }
    }

    /// The `image` crate format used for decoding, if the crate handles it.
    pub fn image_format(&self) -> Option<ImageFormat> {
        match self {
            SourceFormat::Png => Some(ImageFormat::Png),
            SourceFormat::Jpeg => Some(ImageFormat::Jpeg),
            SourceFormat::Gif => Some(ImageFormat::Gif),
            SourceFormat::WebP => Some(ImageFormat::WebP),
            SourceFormat::Tiff => Some(ImageFormat::Tiff),
            SourceFormat::Other(format) => Some(*format),
            SourceFormat::Heif => None,
        }
    }
}

impl From<ImageFormat> for SourceFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => SourceFormat::Png,
            ImageFormat::Jpeg => SourceFormat::Jpeg,
            ImageFormat::Gif => SourceFormat::Gif,
            ImageFormat::WebP => SourceFormat::WebP,
            ImageFormat::Tiff => SourceFormat::Tiff,
            other => SourceFormat::Other(other),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Png => f.write_str("PNG"),
            SourceFormat::Jpeg => f.write_str("JPEG"),
            SourceFormat::Gif => f.write_str("GIF"),
            SourceFormat::WebP => f.write_str("WebP"),
            SourceFormat::Heif => f.write_str("HEIC/HEIF"),
            SourceFormat::Tiff => f.write_str("TIFF"),
            SourceFormat::Other(format) => write!(f, "{:?}", format),
        }
    }
}

/// `....ftyp<brand>` at the start of the file.
fn is_heif(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
        return false;
    }
    HEIF_BRANDS.iter().any(|brand| &bytes[8..12] == brand.as_slice())
}
