// magick/src/processors/rust_backend.rs
//! Pure Rust backend over the `image` crate ecosystem.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode / encode | `image` codecs, GIF frames via `AnimationDecoder` |
//! | SVG input | `resvg` |
//! | PNG optimize / interlace | `oxipng` |
//! | Resample | `image::DynamicImage::resize_exact` |
//! | Shadow blur | `imageproc::filter::gaussian_blur_f32` |
//! | EXIF properties | `kamadak-exif` |

use super::backend::{Backend, Decoded, ShadowParams};
use super::compressor::Compressor;
use super::effects::{self, CompositeOp};
use super::loader::Loader;
use super::metadata::MetadataProcessor;
use super::resizer::Resizer;
use crate::core::{Frame, ImageInfo, MagickConfig, MagickError, ResizeAlgorithm, Result};
use crate::geometry::Region;
use crate::utils::SourceFormat;
use image::{ImageFormat, Rgba};
use std::path::Path;

#[derive(Clone, Default)]
pub struct RustBackend {
    metadata: MetadataProcessor,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn loader(&self, config: &MagickConfig) -> Loader {
        Loader::new().with_max_dimensions(config.max_dimensions)
    }

    fn compressor(&self, info: &ImageInfo, config: &MagickConfig) -> Compressor {
        Compressor::new(config.quality)
            .with_png_optimization(config.optimize_png)
            .with_progressive(info.progressive)
    }
}

impl Backend for RustBackend {
    fn decode_file(&self, path: &Path, config: &MagickConfig) -> Result<Decoded> {
        self.loader(config).load(path)
    }

    fn decode_blob(&self, data: &[u8], hint: SourceFormat, config: &MagickConfig) -> Result<Decoded> {
        self.loader(config).load_from_bytes(data, hint)
    }

    fn encode_to_blob(
        &self,
        frames: &[Frame],
        info: &ImageInfo,
        format: ImageFormat,
        config: &MagickConfig,
    ) -> Result<Vec<u8>> {
        self.compressor(info, config).compress_to_bytes(frames, format)
    }

    fn encode_to_file(
        &self,
        frames: &[Frame],
        info: &ImageInfo,
        path: &Path,
        format: ImageFormat,
        config: &MagickConfig,
    ) -> Result<()> {
        self.compressor(info, config).save(frames, path, format)
    }

    fn resample(&self, frame: &Frame, width: u32, height: u32, algorithm: ResizeAlgorithm) -> Result<Frame> {
        Resizer::new(algorithm).resize_exact(frame, width, height)
    }

    fn extract_region(&self, frame: &Frame, region: Region) -> Result<Frame> {
        if !region.fits_within(frame.width(), frame.height()) {
            return Err(MagickError::Operation(format!(
                "Crop {}x{}+{}+{} lies outside the {}x{} frame",
                region.width,
                region.height,
                region.x,
                region.y,
                frame.width(),
                frame.height()
            )));
        }

        let image = frame
            .image
            .crop_imm(region.x, region.y, region.width, region.height);
        Ok(frame.with_image(image))
    }

    fn render_shadow(&self, frame: &Frame, params: &ShadowParams) -> Result<Frame> {
        effects::render_shadow(frame, params)
    }

    fn composite_over(&self, target: &Frame, source: &Frame, op: CompositeOp, x: i64, y: i64) -> Result<Frame> {
        effects::composite(target, source, op, x, y)
    }

    fn flatten_on_background(&self, frame: &Frame, background: Rgba<u8>) -> Result<Frame> {
        Ok(effects::flatten(frame, background))
    }

    fn extract_alpha_as_gray(&self, frame: &Frame) -> Result<Frame> {
        Ok(effects::separate_alpha(frame))
    }

    fn invert_channels(&self, frame: &Frame) -> Result<Frame> {
        Ok(effects::negate(frame))
    }

    fn strip_metadata(&self, info: &mut ImageInfo) -> Result<()> {
        self.metadata.strip_metadata(info)
    }
}
