// magick/src/processors/rasterizer.rs
//! SVG input, rendered at its intrinsic size.

use crate::core::{Frame, MagickError, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

/// Whether `data` reads as an XML document with an `<svg` root.
pub fn looks_like_svg(data: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&data[..data.len().min(1024)]);
    let text = head.trim_start_matches('\u{feff}').trim_start();
    text.starts_with('<') && text.contains("<svg")
}

#[derive(Clone)]
pub struct Rasterizer {
    max_dimensions: Option<(u32, u32)>,
}

impl Rasterizer {
    pub fn new(max_dimensions: Option<(u32, u32)>) -> Self {
        Self { max_dimensions }
    }

    pub fn rasterize(&self, data: &[u8]) -> Result<Frame> {
        let text = std::str::from_utf8(data)
            .map_err(|e| MagickError::Input(format!("SVG is not valid UTF-8: {}", e)))?;

        let options = Options::default();
        let tree = Tree::from_str(text, &options)
            .map_err(|e| MagickError::Input(format!("Failed to parse SVG: {}", e)))?;

        let size = tree.size;
        let width = size.width().ceil() as u32;
        let height = size.height().ceil() as u32;
        if let Some((max_w, max_h)) = self.max_dimensions {
            if width > max_w || height > max_h {
                return Err(MagickError::Input(format!(
                    "SVG dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }

        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            MagickError::Input(format!("SVG has an unusable size {}x{}", width, height))
        })?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha.
        let mut image = RgbaImage::new(width, height);
        for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
            let color = src.demultiply();
            *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
        }

        log::debug!("Rasterized SVG at {}x{}", width, height);
        Ok(Frame::new(DynamicImage::ImageRgba8(image)))
    }
}
