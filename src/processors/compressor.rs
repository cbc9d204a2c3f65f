// magick/src/processors/compressor.rs
use crate::core::{Frame, MagickError, Result};
use crate::utils::{image_format_to_string, scene_path};
use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::{Delay, DynamicImage, ImageFormat};
use oxipng::{optimize_from_memory, Interlacing, Options};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

pub struct Compressor {
    quality: u8,
    optimize_png: bool,
    progressive: bool,
}

impl Compressor {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            optimize_png: false,
            progressive: false,
        }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    /// Interlaced PNG output. JPEG output stays baseline.
    pub fn with_progressive(mut self, progressive: bool) -> Self {
        self.progressive = progressive;
        self
    }

    /// Write `frames` to `path`. GIF keeps every frame in one file; other
    /// formats write one scene-numbered file per frame when there is more
    /// than one.
    pub fn save(&self, frames: &[Frame], path: &Path, format: ImageFormat) -> Result<()> {
        log::debug!(
            "Saving {} frame(s) to {} as {}, quality: {}",
            frames.len(),
            path.display(),
            image_format_to_string(format),
            self.quality
        );

        if frames.len() > 1 && format != ImageFormat::Gif {
            for (scene, frame) in frames.iter().enumerate() {
                let scene_file = scene_path(path, scene);
                std::fs::write(&scene_file, self.encode_still(&frame.image, format)?)?;
                self.log_save_result(&scene_file)?;
            }
            return Ok(());
        }

        std::fs::write(path, self.compress_to_bytes(frames, format)?)?;
        self.log_save_result(path)
    }

    /// Encode to memory. Single-image formats take the first frame.
    pub fn compress_to_bytes(&self, frames: &[Frame], format: ImageFormat) -> Result<Vec<u8>> {
        let first = frames
            .first()
            .ok_or_else(|| MagickError::Operation("No frames to encode".to_string()))?;

        match format {
            ImageFormat::Gif => self.encode_animation(frames),
            _ => self.encode_still(&first.image, format),
        }
    }

    fn encode_still(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());

        match format {
            ImageFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
                rgb.write_with_encoder(encoder).map_err(|e| encode_error(format, e))?;
            }
            ImageFormat::Png => {
                image
                    .write_to(&mut buffer, ImageFormat::Png)
                    .map_err(|e| encode_error(format, e))?;
                if self.optimize_png || self.progressive {
                    return self.optimize_png_bytes(&buffer.into_inner());
                }
            }
            _ => {
                normalize_for(image, format)
                    .write_to(&mut buffer, format)
                    .map_err(|e| encode_error(format, e))?;
            }
        }

        Ok(buffer.into_inner())
    }

    fn encode_animation(&self, frames: &[Frame]) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut buffer);
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| encode_error(ImageFormat::Gif, e))?;
            encoder
                .encode_frames(frames.iter().map(|frame| {
                    image::Frame::from_parts(
                        frame.image.to_rgba8(),
                        0,
                        0,
                        Delay::from_numer_denom_ms(frame.delay_ms, 1),
                    )
                }))
                .map_err(|e| encode_error(ImageFormat::Gif, e))?;
        }
        Ok(buffer)
    }

    fn optimize_png_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut options = Options::default();
        if self.progressive {
            options.interlace = Some(Interlacing::Adam7);
        }

        optimize_from_memory(data, &options)
            .map_err(|e| MagickError::Operation(format!("PNG optimization failed: {}", e)))
    }

    fn log_save_result(&self, path: &Path) -> Result<()> {
        let file_size = std::fs::metadata(path)?.len();
        log::info!("Saved image: {} ({} bytes)", path.display(), file_size);
        Ok(())
    }
}

/// Convert to a pixel layout the format's encoder accepts.
fn normalize_for(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    match (format, image) {
        (ImageFormat::Tiff, _) => Cow::Borrowed(image),
        (_, DynamicImage::ImageRgb8(_)) | (_, DynamicImage::ImageRgba8(_)) => Cow::Borrowed(image),
        _ if image.color().has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

fn encode_error(format: ImageFormat, e: image::ImageError) -> MagickError {
    MagickError::Operation(format!(
        "Failed to encode {} image: {}",
        image_format_to_string(format),
        e
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn frame(color: [u8; 4]) -> Frame {
        Frame::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 6, Rgba(color))))
    }

    #[test]
    fn jpeg_output_drops_alpha() {
        let bytes = Compressor::new(90)
            .compress_to_bytes(&[frame([200, 10, 10, 128])], ImageFormat::Jpeg)
            .unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn gif_output_keeps_every_frame() {
        use image::AnimationDecoder;

        let frames = vec![frame([255, 0, 0, 255]), frame([0, 255, 0, 255]), frame([0, 0, 255, 255])];
        let bytes = Compressor::new(85)
            .compress_to_bytes(&frames, ImageFormat::Gif)
            .unwrap();

        let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes)).unwrap();
        assert_eq!(decoder.into_frames().collect_frames().unwrap().len(), 3);
    }

    #[test]
    fn progressive_png_is_still_a_png() {
        let bytes = Compressor::new(85)
            .with_progressive(true)
            .compress_to_bytes(&[frame([1, 2, 3, 255])], ImageFormat::Png)
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn lists_write_one_file_per_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiles.png");
        Compressor::new(85)
            .save(&[frame([0, 0, 0, 255]), frame([255, 255, 255, 255])], &path, ImageFormat::Png)
            .unwrap();

        assert!(dir.path().join("tiles-0.png").exists());
        assert!(dir.path().join("tiles-1.png").exists());
        assert!(!path.exists());
    }

    #[test]
    fn empty_lists_cannot_be_encoded() {
        assert!(Compressor::new(85).compress_to_bytes(&[], ImageFormat::Png).is_err());
    }
}
