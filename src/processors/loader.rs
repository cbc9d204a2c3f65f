// magick/src/processors/loader.rs
use super::backend::Decoded;
use super::metadata::MetadataProcessor;
use super::rasterizer::{looks_like_svg, Rasterizer};
use crate::core::{Frame, ImageInfo, MagickError, Result};
use crate::utils::{image_format_to_string, source_format_from_path, SourceFormat};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

#[derive(Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
    metadata: MetadataProcessor,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((100_000, 100_000)),
            metadata: MetadataProcessor::new(),
        }
    }

    pub fn with_max_dimensions(mut self, max_dimensions: Option<(u32, u32)>) -> Self {
        self.max_dimensions = max_dimensions;
        self
    }

    pub fn load(&self, path: &Path) -> Result<Decoded> {
        log::debug!("Loading image from: {}", path.display());

        self.validate_path(path)?;

        let data = std::fs::read(path).map_err(|e| {
            MagickError::Input(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let source = sniff(&data)
            .or_else(|| source_format_from_path(path))
            .ok_or_else(|| {
                MagickError::Input(format!("Unrecognized image format: {}", path.display()))
            })?;

        self.decode(&data, source)
    }

    pub fn load_from_bytes(&self, data: &[u8], hint: SourceFormat) -> Result<Decoded> {
        if data.is_empty() {
            return Err(MagickError::Input("Image blob is empty".to_string()));
        }

        // Content wins over the hint when it is recognizable.
        let source = sniff(data).unwrap_or(hint);
        self.decode(data, source)
    }

    fn decode(&self, data: &[u8], source: SourceFormat) -> Result<Decoded> {
        let (frames, icc_profile, format) = match source {
            SourceFormat::Raster(ImageFormat::Gif) => {
                (self.decode_animation(data)?, None, ImageFormat::Gif)
            }
            SourceFormat::Raster(format) => {
                let (frames, icc_profile) = self.decode_still(data, format)?;
                (frames, icc_profile, format)
            }
            // Rasterized input is written back out as PNG unless told otherwise.
            SourceFormat::Svg => {
                let frame = Rasterizer::new(self.max_dimensions).rasterize(data)?;
                (vec![frame], None, ImageFormat::Png)
            }
        };

        if let Some((max_w, max_h)) = self.max_dimensions {
            for frame in &frames {
                if frame.width() > max_w || frame.height() > max_h {
                    return Err(MagickError::Input(format!(
                        "Image dimensions {}x{} exceed maximum {}x{}",
                        frame.width(),
                        frame.height(),
                        max_w,
                        max_h
                    )));
                }
            }
        }

        let mut info = ImageInfo::new(format);
        info.source = source;
        info.icc_profile = icc_profile;
        if source != SourceFormat::Svg {
            info.properties.extend(self.metadata.read_properties(data));
        }

        log::info!(
            "Loaded {} image: {}x{} pixels, {} frame(s)",
            source.name(),
            frames[0].width(),
            frames[0].height(),
            frames.len()
        );

        Ok(Decoded { frames, info })
    }

    fn decode_still(&self, data: &[u8], format: ImageFormat) -> Result<(Vec<Frame>, Option<Vec<u8>>)> {
        let reader = ImageReader::with_format(Cursor::new(data), format);
        let mut decoder = reader.into_decoder().map_err(|e| decode_error(format, e))?;

        let icc_profile = decoder.icc_profile().unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable ICC profile: {}", e);
            None
        });

        let image = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(format, e))?;
        Ok((vec![Frame::new(image)], icc_profile))
    }

    fn decode_animation(&self, data: &[u8]) -> Result<Vec<Frame>> {
        let decoder =
            GifDecoder::new(Cursor::new(data)).map_err(|e| decode_error(ImageFormat::Gif, e))?;

        let frames: Vec<Frame> = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| decode_error(ImageFormat::Gif, e))?
            .into_iter()
            .map(|frame| {
                let (numer, denom) = frame.delay().numer_denom_ms();
                let mut decoded = Frame::new(DynamicImage::ImageRgba8(frame.into_buffer()));
                decoded.delay_ms = numer / denom.max(1);
                decoded
            })
            .collect();

        if frames.is_empty() {
            return Err(MagickError::Input("GIF contains no frames".to_string()));
        }

        Ok(frames)
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(MagickError::Input(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let metadata = path
            .metadata()
            .map_err(|e| MagickError::Input(format!("Cannot stat {}: {}", path.display(), e)))?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(MagickError::Input(format!(
                "Not a non-empty file: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn sniff(data: &[u8]) -> Option<SourceFormat> {
    match image::guess_format(data) {
        Ok(format) => Some(SourceFormat::Raster(format)),
        Err(_) if looks_like_svg(data) => Some(SourceFormat::Svg),
        Err(_) => None,
    }
}

fn decode_error(format: ImageFormat, e: image::ImageError) -> MagickError {
    MagickError::Input(format!(
        "Failed to decode {} image: {}",
        image_format_to_string(format),
        e
    ))
}
