// magick/src/processors/resizer.rs
use crate::core::{Frame, MagickError, ResizeAlgorithm, Result};
use image::imageops::FilterType;

pub struct Resizer {
    algorithm: ResizeAlgorithm,
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn resize_exact(&self, frame: &Frame, width: u32, height: u32) -> Result<Frame> {
        if width == 0 || height == 0 {
            return Err(MagickError::Operation(format!(
                "Cannot resample to an empty {}x{} frame",
                width, height
            )));
        }

        if width == frame.width() && height == frame.height() {
            log::debug!("Image dimensions unchanged, skipping resize");
            return Ok(frame.clone());
        }

        log::debug!(
            "Resizing frame from {}x{} to {}x{}",
            frame.width(),
            frame.height(),
            width,
            height
        );

        let image = frame.image.resize_exact(width, height, self.get_filter_type());
        Ok(frame.with_image(image))
    }

    fn get_filter_type(&self) -> FilterType {
        match self.algorithm {
            ResizeAlgorithm::Nearest => FilterType::Nearest,
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}
