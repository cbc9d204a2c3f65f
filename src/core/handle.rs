// magick/src/core/handle.rs
//! The image handle and its transform operations.
//!
//! A handle always holds a list of frames; a single image is a list of one.
//! Operations build the complete replacement frame list first and commit it
//! only on success, so a failed call leaves the handle untouched.
//!
//! Handles are not internally synchronized. Callers sharing one across threads
//! must serialize access themselves.

use super::{lifecycle, MagickConfig, MagickError, Result};
use crate::geometry::{
    fit_scale, parse_geometry, resize_ratio, resolve_dimensions, resolve_region, GeometrySpec,
    Region, TileGrid,
};
use crate::processors::{Backend, CompositeOp, Decoded, RustBackend, ShadowParams};
use crate::utils::{
    format_from_hint, image_format_to_string, parse_color, source_format_from_path, SourceFormat,
};
use image::{ColorType, DynamicImage, ImageFormat};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// One decoded raster image within a handle's list.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub image: DynamicImage,
    /// Animation delay, in milliseconds.
    pub delay_ms: u32,
}

impl Frame {
    pub fn new(image: DynamicImage) -> Self {
        Self { image, delay_ms: 0 }
    }

    /// Same frame metadata, new pixels.
    pub fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image,
            delay_ms: self.delay_ms,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn color_type(&self) -> ColorType {
        self.image.color()
    }
}

/// Image-level info shared by every frame of a handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    /// Output format used when none is named.
    pub format: ImageFormat,
    /// What the input was decoded from.
    pub source: SourceFormat,
    pub properties: HashMap<String, String>,
    pub icc_profile: Option<Vec<u8>>,
    /// Interlace hint consumed at encode time.
    pub progressive: bool,
}

impl ImageInfo {
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            source: SourceFormat::Raster(format),
            properties: HashMap::new(),
            icc_profile: None,
            progressive: false,
        }
    }
}

pub struct MagickImage {
    pub(super) frames: Vec<Frame>,
    pub(super) info: Option<ImageInfo>,
    pub(super) config: MagickConfig,
    pub(super) backend: Arc<dyn Backend>,
}

impl fmt::Debug for MagickImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MagickImage")
            .field("frames", &self.frames.len())
            .field("info", &self.info)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MagickImage {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with(path, MagickConfig::default())
    }

    pub fn from_file_with<P: AsRef<Path>>(path: P, config: MagickConfig) -> Result<Self> {
        Self::from_file_using(path, config, Arc::new(RustBackend::new()))
    }

    pub fn from_file_using<P: AsRef<Path>>(
        path: P,
        config: MagickConfig,
        backend: Arc<dyn Backend>,
    ) -> Result<Self> {
        config.validate()?;
        warn_if_uninitialized();

        let decoded = backend.decode_file(path.as_ref(), &config)?;
        Ok(Self::assemble(decoded, config, backend))
    }

    /// Decode an in-memory blob. `format` is an extension or MIME type such as
    /// `"png"` or `"image/jpeg"`; a blank hint is an error.
    pub fn from_blob(data: &[u8], format: &str) -> Result<Self> {
        Self::from_blob_with(data, format, MagickConfig::default())
    }

    pub fn from_blob_with(data: &[u8], format: &str, config: MagickConfig) -> Result<Self> {
        Self::from_blob_using(data, format, config, Arc::new(RustBackend::new()))
    }

    pub fn from_blob_using(
        data: &[u8],
        format: &str,
        config: MagickConfig,
        backend: Arc<dyn Backend>,
    ) -> Result<Self> {
        config.validate()?;
        warn_if_uninitialized();

        let hint = format_from_hint(format)?;
        if data.is_empty() {
            return Err(MagickError::Input("Image blob is empty".to_string()));
        }

        let decoded = backend.decode_blob(data, hint, &config)?;
        Ok(Self::assemble(decoded, config, backend))
    }

    /// Wrap pixels that are already in memory.
    pub fn from_image(image: DynamicImage, format: ImageFormat) -> Self {
        Self {
            frames: vec![Frame::new(image)],
            info: Some(ImageInfo::new(format)),
            config: MagickConfig::default(),
            backend: Arc::new(RustBackend::new()),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = backend;
        self
    }

    fn assemble(decoded: Decoded, config: MagickConfig, backend: Arc<dyn Backend>) -> Self {
        Self {
            frames: decoded.frames,
            info: Some(decoded.info),
            config,
            backend,
        }
    }

    /// The image-level info, or a state error once the handle is unusable.
    pub(super) fn ensure_live(&self) -> Result<&ImageInfo> {
        match &self.info {
            Some(info) if !self.frames.is_empty() => Ok(info),
            Some(_) => Err(MagickError::State("Image list is empty".to_string())),
            None => Err(MagickError::State("Image handle has been destroyed".to_string())),
        }
    }

    fn live_info_mut(&mut self) -> Result<&mut ImageInfo> {
        self.ensure_live()?;
        self.info
            .as_mut()
            .ok_or_else(|| MagickError::State("Image handle has been destroyed".to_string()))
    }

    fn first_frame(&self) -> Result<&Frame> {
        self.ensure_live()?;
        self.frames
            .first()
            .ok_or_else(|| MagickError::State("Image list is empty".to_string()))
    }

    /// Apply `op` to every frame; commit only if all succeed.
    fn map_frames<F>(&mut self, name: &str, mut op: F) -> Result<()>
    where
        F: FnMut(&dyn Backend, &Frame) -> Result<Frame>,
    {
        self.ensure_live()?;

        let backend = self.backend.as_ref();
        let frames = self
            .frames
            .iter()
            .map(|frame| op(backend, frame))
            .collect::<Result<Vec<_>>>()?;

        log::debug!("{} applied to {} frame(s)", name, frames.len());
        self.frames = frames;
        Ok(())
    }

    pub fn width(&self) -> Result<u32> {
        Ok(self.first_frame()?.width())
    }

    pub fn height(&self) -> Result<u32> {
        Ok(self.first_frame()?.height())
    }

    /// Name of the decoded format, e.g. `"PNG"` or `"SVG"`.
    pub fn image_type(&self) -> Result<String> {
        Ok(self.ensure_live()?.source.name())
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn config(&self) -> &MagickConfig {
        &self.config
    }

    pub fn properties(&self) -> Result<&HashMap<String, String>> {
        Ok(&self.ensure_live()?.properties)
    }

    pub fn get_property(&self, key: &str) -> Result<Option<&str>> {
        Ok(self.ensure_live()?.properties.get(key).map(String::as_str))
    }

    /// Store `value` under `key` verbatim.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<()> {
        self.live_info_mut()?
            .properties
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn parse_geometry(&self, geometry: &str) -> Result<GeometrySpec> {
        parse_geometry(geometry)
    }

    /// Area ratio of a `width x height` box to the current frame.
    pub fn resize_ratio(&self, width: u32, height: u32) -> Result<f64> {
        let frame = self.first_frame()?;
        Ok(resize_ratio(width, height, frame.width(), frame.height()))
    }

    /// Per-axis scale at which the current frame fits inside `width x height`.
    pub fn fit_scale(&self, width: u32, height: u32) -> Result<f64> {
        let frame = self.first_frame()?;
        Ok(fit_scale(width, height, frame.width(), frame.height()))
    }

    pub fn resize(&mut self, geometry: &str) -> Result<()> {
        self.ensure_live()?;
        let spec = parse_geometry(geometry)?;
        let config = self.config.clone();

        self.map_frames("resize", |backend, frame| {
            let (width, height) = resolve_dimensions(&spec, frame.width(), frame.height());
            log::debug!(
                "Resize {} on {}x{} resolves to {}x{}",
                spec,
                frame.width(),
                frame.height(),
                width,
                height
            );
            config.check_output_size(width, height)?;
            backend.resample(frame, width, height, config.algorithm)
        })
    }

    pub fn crop(&mut self, geometry: &str) -> Result<()> {
        self.ensure_live()?;
        let spec = parse_geometry(geometry)?;

        self.map_frames("crop", |backend, frame| {
            let (x, y, width, height) = resolve_region(&spec, frame.width(), frame.height());
            let x = u32::try_from(x).map_err(|_| negative_offset(&spec))?;
            let y = u32::try_from(y).map_err(|_| negative_offset(&spec))?;
            backend.extract_region(frame, Region::new(x, y, width, height))
        })
    }

    /// Replace every frame by its tiles, row-major.
    pub fn crop_to_tiles(&mut self, geometry: &str) -> Result<()> {
        self.ensure_live()?;
        let spec = parse_geometry(geometry)?;

        let mut tiles = Vec::new();
        for frame in &self.frames {
            let grid = TileGrid::for_geometry(&spec, frame.width(), frame.height())?;
            tiles.reserve(grid.len());
            for region in grid.cells() {
                tiles.push(self.backend.extract_region(frame, region)?);
            }
        }

        log::info!(
            "Cropped {} frame(s) into {} tiles",
            self.frames.len(),
            tiles.len()
        );
        self.frames = tiles;
        Ok(())
    }

    /// Drop shadow beneath the current content. `opacity` is a percentage.
    pub fn shadow(
        &mut self,
        color: &str,
        opacity: f64,
        blur_radius: f64,
        x_offset: i32,
        y_offset: i32,
    ) -> Result<()> {
        self.ensure_live()?;
        if !(0.0..=100.0).contains(&opacity) {
            return Err(MagickError::Input(format!(
                "Shadow opacity must be within 0..=100, got {}",
                opacity
            )));
        }
        if !blur_radius.is_finite() || blur_radius < 0.0 {
            return Err(MagickError::Input(format!(
                "Shadow blur radius must be a non-negative number, got {}",
                blur_radius
            )));
        }

        let params = ShadowParams {
            color: parse_color(color)?,
            opacity: opacity as f32,
            sigma: blur_radius as f32,
            x_offset,
            y_offset,
        };
        let config = self.config.clone();

        self.map_frames("shadow", |backend, frame| {
            let layout = params.layout(frame.width(), frame.height()).ok_or_else(|| {
                MagickError::Operation(format!(
                    "Shadow blur {} with offset {:+}{:+} is too large",
                    blur_radius, x_offset, y_offset
                ))
            })?;
            config.check_output_size(layout.canvas_width, layout.canvas_height)?;
            backend.render_shadow(frame, &params)
        })
    }

    /// Overlay `source`'s first frame onto every frame at `(x, y)`.
    pub fn compose(&mut self, op: CompositeOp, source: &MagickImage, x: i64, y: i64) -> Result<()> {
        self.ensure_live()?;
        let overlay = source.first_frame()?;

        self.map_frames("compose", |backend, frame| {
            backend.composite_over(frame, overlay, op, x, y)
        })
    }

    pub fn fill_background_color(&mut self, color: &str) -> Result<()> {
        self.ensure_live()?;
        let background = parse_color(color)?;
        self.map_frames("fill background", |backend, frame| {
            backend.flatten_on_background(frame, background)
        })
    }

    /// Replace each frame by its alpha channel as grayscale. Frames without
    /// alpha become solid white.
    pub fn separate_alpha_channel(&mut self) -> Result<()> {
        self.map_frames("separate alpha", |backend, frame| backend.extract_alpha_as_gray(frame))
    }

    pub fn negate(&mut self) -> Result<()> {
        self.map_frames("negate", |backend, frame| backend.invert_channels(frame))
    }

    /// Remove embedded profiles and metadata properties.
    pub fn strip(&mut self) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        let info = self.live_info_mut()?;
        let mut stripped = info.clone();
        backend.strip_metadata(&mut stripped)?;
        *info = stripped;
        Ok(())
    }

    /// Ask the encoder for interlaced output.
    pub fn progressive(&mut self) -> Result<()> {
        self.live_info_mut()?.progressive = true;
        Ok(())
    }

    pub fn is_progressive(&self) -> Result<bool> {
        Ok(self.ensure_live()?.progressive)
    }

    pub fn to_blob(&self, format: &str) -> Result<Vec<u8>> {
        let info = self.ensure_live()?;
        let format = format_from_hint(format)?.encoder()?;
        let bytes = self
            .backend
            .encode_to_blob(&self.frames, info, format, &self.config)?;

        log::info!(
            "Encoded {} bytes as {}",
            bytes.len(),
            image_format_to_string(format)
        );
        Ok(bytes)
    }

    /// Write to `path`, choosing the format from its extension and falling back
    /// to the decoded format.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let info = self.ensure_live()?;
        let path = path.as_ref();
        let format = match source_format_from_path(path) {
            Some(source) => source.encoder()?,
            None => info.format,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        self.backend
            .encode_to_file(&self.frames, info, path, format, &self.config)
    }

    /// Release every frame. A second call is a state error.
    pub fn destroy(&mut self) -> Result<()> {
        if self.info.is_none() {
            return Err(MagickError::State(
                "Image handle has already been destroyed".to_string(),
            ));
        }

        let released = self.frames.len();
        self.frames = Vec::new();
        self.info = None;
        log::debug!("Destroyed image handle ({} frame(s) released)", released);
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        self.info.is_none()
    }
}

fn negative_offset(spec: &GeometrySpec) -> MagickError {
    MagickError::Operation(format!("Crop {} starts outside the frame", spec))
}

fn warn_if_uninitialized() {
    if !lifecycle::is_instantiated() {
        log::warn!("Image handle created before magick::genesis()");
    }
}
