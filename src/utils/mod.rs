// magick/src/utils/mod.rs
mod color;

pub use color::parse_color;

use crate::core::{MagickError, Result};
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// What a blob or file is decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Raster(ImageFormat),
    /// Rasterized at its intrinsic size.
    Svg,
}

impl SourceFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("svg") {
            return Some(SourceFormat::Svg);
        }
        ImageFormat::from_extension(ext).map(SourceFormat::Raster)
    }

    /// Format name as reported by `image_type`, e.g. `"PNG"` or `"SVG"`.
    pub fn name(self) -> String {
        match self {
            SourceFormat::Raster(format) => image_format_to_string(format),
            SourceFormat::Svg => "SVG".to_string(),
        }
    }

    /// The encoder for this format; vector output is not supported.
    pub fn encoder(self) -> Result<ImageFormat> {
        match self {
            SourceFormat::Raster(format) => Ok(format),
            SourceFormat::Svg => Err(MagickError::Input(
                "SVG can be read but not written".to_string(),
            )),
        }
    }
}

/// Resolve a caller-supplied format hint (`"png"`, `"JPG"`, `"image/jpeg"`,
/// `"image/svg+xml"`).
///
/// Blank or punctuation-only hints are errors, never a request to auto-detect.
pub fn format_from_hint(hint: &str) -> Result<SourceFormat> {
    let trimmed = hint.trim();
    let lowered = trimmed
        .rsplit_once('/')
        .map(|(_, subtype)| subtype)
        .unwrap_or(trimmed)
        .to_ascii_lowercase();
    let ext = lowered.trim_end_matches("+xml");

    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(MagickError::Input(format!("Invalid format hint: {:?}", hint)));
    }

    SourceFormat::from_extension(ext)
        .ok_or_else(|| MagickError::Input(format!("Unsupported format: {}", hint)))
}

pub fn source_format_from_path(path: &Path) -> Option<SourceFormat> {
    get_file_extension(path).and_then(|ext| SourceFormat::from_extension(&ext))
}

pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

/// `out.png` -> `out-3.png`, for writing one file per frame.
pub fn scene_path(path: &Path, scene: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    let file_name = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, scene, ext),
        None => format!("{}-{}", stem, scene),
    };

    path.with_file_name(file_name)
}

pub fn image_format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Png => "PNG",
        ImageFormat::Gif => "GIF",
        ImageFormat::WebP => "WEBP",
        ImageFormat::Pnm => "PNM",
        ImageFormat::Tiff => "TIFF",
        ImageFormat::Tga => "TGA",
        ImageFormat::Dds => "DDS",
        ImageFormat::Bmp => "BMP",
        ImageFormat::Ico => "ICO",
        ImageFormat::Hdr => "HDR",
        ImageFormat::OpenExr => "EXR",
        ImageFormat::Farbfeld => "FARBFELD",
        ImageFormat::Avif => "AVIF",
        ImageFormat::Qoi => "QOI",
        _ => "UNKNOWN",
    }
    .to_string()
}
