// magick/src/processors/effects.rs
//! Shadow, composite, flatten, alpha extraction and negation.

use super::backend::ShadowParams;
use crate::core::{Frame, MagickError, Result};
use image::{imageops, DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::filter::gaussian_blur_f32;

/// Blend rule used when overlaying one frame onto another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOp {
    Over,
    Copy,
    Screen,
    Multiply,
    Darken,
    Lighten,
    Difference,
    Plus,
}

impl CompositeOp {
    fn mix(self, backdrop: f32, source: f32) -> f32 {
        match self {
            CompositeOp::Over | CompositeOp::Copy => source,
            CompositeOp::Screen => backdrop + source - backdrop * source,
            CompositeOp::Multiply => backdrop * source,
            CompositeOp::Darken => backdrop.min(source),
            CompositeOp::Lighten => backdrop.max(source),
            CompositeOp::Difference => (backdrop - source).abs(),
            CompositeOp::Plus => (backdrop + source).min(1.0),
        }
    }

    /// Blend `source` onto `backdrop` with source-over alpha compositing.
    pub fn blend(self, backdrop: Rgba<u8>, source: Rgba<u8>) -> Rgba<u8> {
        if self == CompositeOp::Copy {
            return source;
        }

        let sa = source[3] as f32 / 255.0;
        let ba = backdrop[3] as f32 / 255.0;
        let alpha = sa + ba * (1.0 - sa);
        if alpha <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }

        let mut out = [0u8; 4];
        for c in 0..3 {
            let cs = source[c] as f32 / 255.0;
            let cb = backdrop[c] as f32 / 255.0;
            let co = cs * sa * (1.0 - ba) + cb * ba * (1.0 - sa) + sa * ba * self.mix(cb, cs);
            out[c] = to_channel(co / alpha);
        }
        out[3] = to_channel(alpha);
        Rgba(out)
    }
}

fn to_channel(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Blurred, tinted silhouette of the frame's alpha, merged beneath the frame.
///
/// The silhouette is padded by `2 * sigma` on every side and placed at
/// `(x_offset - pad, y_offset - pad)`; the result covers both layers.
pub fn render_shadow(frame: &Frame, params: &ShadowParams) -> Result<Frame> {
    let source = frame.image.to_rgba8();
    let (width, height) = source.dimensions();
    let layout = params.layout(width, height).ok_or_else(|| {
        MagickError::Operation(format!(
            "Shadow of a {}x{} frame (sigma {}, offset {:+}{:+}) is too large",
            width, height, params.sigma, params.x_offset, params.y_offset
        ))
    })?;
    let pad = layout.pad;

    let Rgba([r, g, b, a]) = params.color;
    let strength = params.opacity / 100.0 * (a as f32 / 255.0);

    let mut silhouette = RgbaImage::from_pixel(width + 2 * pad, height + 2 * pad, Rgba([r, g, b, 0]));
    for (x, y, pixel) in source.enumerate_pixels() {
        let alpha = (pixel[3] as f32 * strength).round() as u8;
        silhouette.put_pixel(x + pad, y + pad, Rgba([r, g, b, alpha]));
    }
    if params.sigma > 0.0 {
        silhouette = gaussian_blur_f32(&silhouette, params.sigma);
    }

    let mut canvas = RgbaImage::new(layout.canvas_width, layout.canvas_height);
    let (shadow_x, shadow_y) = layout.shadow_origin;
    let (frame_x, frame_y) = layout.frame_origin;
    imageops::overlay(&mut canvas, &silhouette, shadow_x, shadow_y);
    imageops::overlay(&mut canvas, &source, frame_x, frame_y);

    log::debug!(
        "Rendered shadow: {}x{} -> {}x{} (sigma {}, opacity {})",
        width,
        height,
        canvas.width(),
        canvas.height(),
        params.sigma,
        params.opacity
    );
    Ok(frame.with_image(DynamicImage::ImageRgba8(canvas)))
}

/// Overlay `source` onto `target` with its top-left corner at `(x, y)`.
///
/// Only the overlapping part is blended; the target keeps its dimensions.
pub fn composite(target: &Frame, source: &Frame, op: CompositeOp, x: i64, y: i64) -> Result<Frame> {
    let mut canvas = target.image.to_rgba8();
    let overlay = source.image.to_rgba8();
    let (tw, th) = (canvas.width() as i64, canvas.height() as i64);

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + overlay.width() as i64).min(tw);
    let y1 = (y + overlay.height() as i64).min(th);
    if x0 >= x1 || y0 >= y1 {
        return Err(MagickError::Operation(format!(
            "{}x{} source at {:+}{:+} does not overlap the {}x{} target",
            overlay.width(),
            overlay.height(),
            x,
            y,
            tw,
            th
        )));
    }

    for ty in y0..y1 {
        for tx in x0..x1 {
            let src = *overlay.get_pixel((tx - x) as u32, (ty - y) as u32);
            let dst = canvas.get_pixel_mut(tx as u32, ty as u32);
            *dst = op.blend(*dst, src);
        }
    }

    let image = if target.image.color().has_alpha() {
        DynamicImage::ImageRgba8(canvas)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    };
    Ok(target.with_image(image))
}

pub fn flatten(frame: &Frame, background: Rgba<u8>) -> Frame {
    let source = frame.image.to_rgba8();
    let mut canvas = RgbaImage::from_pixel(source.width(), source.height(), background);
    imageops::overlay(&mut canvas, &source, 0, 0);

    let image = if background[3] == u8::MAX {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    } else {
        DynamicImage::ImageRgba8(canvas)
    };
    frame.with_image(image)
}

/// The alpha channel as grayscale. Frames without alpha are fully opaque,
/// so they come out white.
pub fn separate_alpha(frame: &Frame) -> Frame {
    let (width, height) = (frame.width(), frame.height());
    let gray = if frame.image.color().has_alpha() {
        let rgba = frame.image.to_rgba8();
        GrayImage::from_fn(width, height, |x, y| Luma([rgba.get_pixel(x, y)[3]]))
    } else {
        GrayImage::from_pixel(width, height, Luma([u8::MAX]))
    };
    frame.with_image(DynamicImage::ImageLuma8(gray))
}

/// Invert color channels; alpha is left alone.
pub fn negate(frame: &Frame) -> Frame {
    let mut image = frame.image.clone();
    image.invert();
    frame.with_image(image)
}
