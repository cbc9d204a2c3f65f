// magick/src/geometry/dimensions.rs
//! Turns a [`GeometrySpec`] plus a source size into concrete pixel sizes.
//!
//! All functions here are pure.

use super::{GeometrySpec, Modifier};

/// Resolve the target size a resize should produce.
///
/// Precedence: area (`@`), then percent on both axes, then literal (`!`),
/// then aspect preserving fit (or cover with `^`). A percentage on one axis
/// only is turned into pixels first and then treated like a pixel value. `>`
/// and `<` clamp the result per dimension against the source. Results are
/// rounded and at least 1.
pub fn resolve_dimensions(spec: &GeometrySpec, source_width: u32, source_height: u32) -> (u32, u32) {
    let sw = source_width.max(1) as f64;
    let sh = source_height.max(1) as f64;

    let (mut width, mut height) = if spec.modifier == Some(Modifier::Area) {
        let area = match (spec.width, spec.height) {
            (Some(w), Some(h)) => w as f64 * h as f64,
            (Some(v), None) | (None, Some(v)) => v as f64,
            (None, None) => sw * sh,
        };
        let scale = (area / (sw * sh)).sqrt();
        (sw * scale, sh * scale)
    } else if spec.width_percent && spec.height_percent {
        let px = spec.width_percentage().unwrap_or(100) as f64;
        let py = spec.height_percentage().unwrap_or(100) as f64;
        (sw * px / 100.0, sh * py / 100.0)
    } else {
        let target_width = spec.width.map(|w| relative(w, spec.width_percent, sw));
        let target_height = spec.height.map(|h| relative(h, spec.height_percent, sh));

        if spec.modifier == Some(Modifier::IgnoreAspect) {
            (target_width.unwrap_or(sw), target_height.unwrap_or(sh))
        } else {
            fit_box(spec, target_width, target_height, sw, sh)
        }
    };

    match spec.modifier {
        Some(Modifier::ShrinkOnly) => {
            width = width.min(sw);
            height = height.min(sh);
        }
        Some(Modifier::GrowOnly) => {
            width = width.max(sw);
            height = height.max(sh);
        }
        _ => {}
    }

    (to_pixels(width), to_pixels(height))
}

fn relative(value: u32, percent: bool, source: f64) -> f64 {
    if percent {
        source * value as f64 / 100.0
    } else {
        value as f64
    }
}

/// Aspect-preserving size for a box where either side may be missing.
fn fit_box(spec: &GeometrySpec, width: Option<f64>, height: Option<f64>, sw: f64, sh: f64) -> (f64, f64) {
    match (width, height) {
        (Some(w), Some(h)) => {
            let sx = w / sw;
            let sy = h / sh;
            let scale = if spec.modifier == Some(Modifier::Fill) {
                sx.max(sy)
            } else {
                sx.min(sy)
            };
            (sw * scale, sh * scale)
        }
        (Some(w), None) => (w, w * sh / sw),
        (None, Some(h)) => (h * sw / sh, h),
        (None, None) => (sw, sh),
    }
}

/// Resolve the rectangle a crop should extract.
///
/// Missing dimensions default to the source's; percentages are relative to the
/// source. Offsets are returned unchecked, bounds are the caller's business.
pub fn resolve_region(spec: &GeometrySpec, source_width: u32, source_height: u32) -> (i64, i64, u32, u32) {
    let width = match spec.width_percentage() {
        Some(p) => to_pixels(source_width as f64 * p as f64 / 100.0),
        None => spec.width.unwrap_or(source_width),
    };
    let height = match spec.height_percentage() {
        Some(p) => to_pixels(source_height as f64 * p as f64 / 100.0),
        None => spec.height.unwrap_or(source_height),
    };

    (spec.x_offset() as i64, spec.y_offset() as i64, width, height)
}

/// Ratio of the requested pixel area to the source area: `(w*h)/(sw*sh)`.
pub fn resize_ratio(width: u32, height: u32, source_width: u32, source_height: u32) -> f64 {
    let source_area = source_width as f64 * source_height as f64;
    if source_area == 0.0 {
        return 0.0;
    }
    (width as f64 * height as f64) / source_area
}

/// Largest per-axis scale at which the source fits inside `width x height`.
pub fn fit_scale(width: u32, height: u32, source_width: u32, source_height: u32) -> f64 {
    if source_width == 0 || source_height == 0 {
        return 0.0;
    }
    (width as f64 / source_width as f64).min(height as f64 / source_height as f64)
}

fn to_pixels(value: f64) -> u32 {
    value.round().clamp(1.0, u32::MAX as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::parse_geometry;

    fn resolve(geometry: &str, w: u32, h: u32) -> (u32, u32) {
        resolve_dimensions(&parse_geometry(geometry).unwrap(), w, h)
    }

    #[test]
    fn exact_size_ignores_aspect() {
        assert_eq!(resolve("100x100!", 600, 552), (100, 100));
        assert_eq!(resolve("100x100!", 10, 20), (100, 100));
    }

    #[test]
    fn plain_box_fits_inside_preserving_aspect() {
        assert_eq!(resolve("100x100", 600, 552), (100, 92));
        assert_eq!(resolve("100x100", 300, 600), (50, 100));
    }

    #[test]
    fn fill_covers_the_box() {
        assert_eq!(resolve("100x100^", 600, 300), (200, 100));
    }

    #[test]
    fn single_dimension_derives_the_other() {
        assert_eq!(resolve("300", 600, 552), (300, 276));
        assert_eq!(resolve("x276", 600, 552), (300, 276));
        // Never collapses to zero.
        assert_eq!(resolve("1", 1000, 10), (1, 1));
    }

    #[test]
    fn percent_scales_each_dimension() {
        assert_eq!(resolve("25%x100%", 600, 552), (150, 552));
        assert_eq!(resolve("50%", 600, 552), (300, 276));
        assert_eq!(resolve("x50%", 600, 552), (300, 276));
        assert_eq!(resolve("25x100%", 600, 552), (150, 552));
    }

    #[test]
    fn percent_on_one_axis_leaves_the_other_in_pixels() {
        assert_eq!(resolve("25%x100!", 600, 552), (150, 100));
        // 150x100 box, aspect preserved.
        assert_eq!(resolve("25%x100", 600, 552), (109, 100));
    }

    #[test]
    fn shrink_only_never_enlarges() {
        assert_eq!(resolve("100x100>", 600, 552), (100, 92));
        assert_eq!(resolve("1000x1000>", 600, 552), (600, 552));
        assert_eq!(resolve("200%>", 600, 552), (600, 552));
        assert_eq!(resolve("50%>", 600, 552), (300, 276));
    }

    #[test]
    fn grow_only_never_reduces() {
        assert_eq!(resolve("100x100<", 600, 552), (600, 552));
        assert_eq!(resolve("1200x1200<", 600, 600), (1200, 1200));
    }

    #[test]
    fn area_targets_a_pixel_count() {
        let (w, h) = resolve("10000@", 200, 200);
        assert_eq!((w, h), (100, 100));
    }

    #[test]
    fn resize_ratio_is_the_area_ratio() {
        let ratio = resize_ratio(300, 300, 600, 552);
        assert!(ratio > 0.27 && ratio < 0.28);
        assert_eq!(resize_ratio(10, 10, 0, 0), 0.0);
    }

    #[test]
    fn fit_scale_is_the_smaller_axis_ratio() {
        assert_eq!(fit_scale(300, 300, 600, 552), 0.5);
        assert_eq!(fit_scale(100, 50, 100, 100), 0.5);
    }

    #[test]
    fn crop_region_defaults_to_source_dimensions() {
        let spec = parse_geometry("100x100!+10+10").unwrap();
        assert_eq!(resolve_region(&spec, 600, 552), (10, 10, 100, 100));

        let spec = parse_geometry("100+5+5").unwrap();
        assert_eq!(resolve_region(&spec, 600, 552), (5, 5, 100, 552));

        let spec = parse_geometry("50%").unwrap();
        assert_eq!(resolve_region(&spec, 600, 552), (0, 0, 300, 276));

        let spec = parse_geometry("25%x100+0+10").unwrap();
        assert_eq!(resolve_region(&spec, 600, 552), (0, 10, 150, 100));
    }
}
