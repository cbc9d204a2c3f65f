// magick/src/processors/backend.rs
//! The pixel-level collaborator behind every [`MagickImage`](crate::MagickImage).
//!
//! The handle decides *what* region, size or placement to ask for; a
//! [`Backend`] decides *how* the pixels are produced. Every pixel operation is
//! pure: it borrows a frame and returns a new one, so a handle can build the
//! complete new frame list before committing any of it.

use super::effects::CompositeOp;
use crate::core::{Frame, ImageInfo, MagickConfig, ResizeAlgorithm, Result};
use crate::geometry::Region;
use crate::utils::SourceFormat;
use image::{ImageFormat, Rgba};
use std::path::Path;

/// Frames and image-level info produced by a decode.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub frames: Vec<Frame>,
    pub info: ImageInfo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    pub color: Rgba<u8>,
    /// 0..=100.
    pub opacity: f32,
    /// Gaussian sigma in pixels; 0 disables the blur.
    pub sigma: f32,
    pub x_offset: i32,
    pub y_offset: i32,
}

/// Where the layers of a shadowed frame land on the merged canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowLayout {
    /// Blur margin around the silhouette, `ceil(2 * sigma)`.
    pub pad: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Top-left of the padded silhouette.
    pub shadow_origin: (i64, i64),
    /// Top-left of the original frame.
    pub frame_origin: (i64, i64),
}

impl ShadowParams {
    /// Canvas geometry for shadowing a `width x height` frame, or `None` when
    /// it does not fit in `u32` pixel coordinates.
    pub fn layout(&self, width: u32, height: u32) -> Option<ShadowLayout> {
        let pad = (2.0 * f64::from(self.sigma)).ceil();
        if !(0.0..=f64::from(u32::MAX)).contains(&pad) {
            return None;
        }
        let pad = pad as i64;

        let axis = |size: u32, offset: i32| -> Option<(u32, i64, i64)> {
            let size = i64::from(size);
            let shadow_start = i64::from(offset) - pad;
            let shadow_end = shadow_start + size + 2 * pad;
            let origin = shadow_start.min(0);
            let extent = u32::try_from(shadow_end.max(size) - origin).ok()?;
            Some((extent, shadow_start - origin, -origin))
        };
        let (canvas_width, shadow_x, frame_x) = axis(width, self.x_offset)?;
        let (canvas_height, shadow_y, frame_y) = axis(height, self.y_offset)?;

        Some(ShadowLayout {
            pad: pad as u32,
            canvas_width,
            canvas_height,
            shadow_origin: (shadow_x, shadow_y),
            frame_origin: (frame_x, frame_y),
        })
    }
}

pub trait Backend: Send + Sync {
    fn decode_file(&self, path: &Path, config: &MagickConfig) -> Result<Decoded>;

    /// Decode an in-memory blob. `hint` is used when the content itself is not
    /// recognized.
    fn decode_blob(&self, data: &[u8], hint: SourceFormat, config: &MagickConfig) -> Result<Decoded>;

    fn encode_to_blob(
        &self,
        frames: &[Frame],
        info: &ImageInfo,
        format: ImageFormat,
        config: &MagickConfig,
    ) -> Result<Vec<u8>>;

    fn encode_to_file(
        &self,
        frames: &[Frame],
        info: &ImageInfo,
        path: &Path,
        format: ImageFormat,
        config: &MagickConfig,
    ) -> Result<()>;

    fn resample(&self, frame: &Frame, width: u32, height: u32, algorithm: ResizeAlgorithm) -> Result<Frame>;

    /// Fails when `region` is not fully inside the frame.
    fn extract_region(&self, frame: &Frame, region: Region) -> Result<Frame>;

    fn render_shadow(&self, frame: &Frame, params: &ShadowParams) -> Result<Frame>;

    fn composite_over(&self, target: &Frame, source: &Frame, op: CompositeOp, x: i64, y: i64) -> Result<Frame>;

    fn flatten_on_background(&self, frame: &Frame, background: Rgba<u8>) -> Result<Frame>;

    fn extract_alpha_as_gray(&self, frame: &Frame) -> Result<Frame>;

    fn invert_channels(&self, frame: &Frame) -> Result<Frame>;

    fn strip_metadata(&self, info: &mut ImageInfo) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(sigma: f32, x_offset: i32, y_offset: i32) -> ShadowParams {
        ShadowParams {
            color: Rgba([0, 0, 0, 255]),
            opacity: 50.0,
            sigma,
            x_offset,
            y_offset,
        }
    }

    #[test]
    fn layout_pads_by_twice_sigma() {
        let layout = params(2.0, 0, 0).layout(600, 552).unwrap();
        assert_eq!(layout.pad, 4);
        assert_eq!((layout.canvas_width, layout.canvas_height), (608, 560));
        assert_eq!(layout.shadow_origin, (0, 0));
        assert_eq!(layout.frame_origin, (4, 4));
    }

    #[test]
    fn layout_follows_negative_offsets() {
        let layout = params(0.0, -5, 3).layout(10, 10).unwrap();
        assert_eq!((layout.canvas_width, layout.canvas_height), (15, 13));
        assert_eq!(layout.shadow_origin, (0, 3));
        assert_eq!(layout.frame_origin, (5, 0));
    }

    #[test]
    fn oversized_layouts_are_rejected() {
        assert!(params(3.0e9, 0, 0).layout(10, 10).is_none());
        assert!(params(f32::INFINITY, 0, 0).layout(10, 10).is_none());
        assert!(params(0.0, i32::MAX, 0).layout(u32::MAX, 10).is_none());
    }
}
