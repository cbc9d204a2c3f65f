// magick/src/core/mod.rs
mod handle;
mod lifecycle;
mod list;

pub use handle::{Frame, ImageInfo, MagickImage};
pub use lifecycle::{genesis, is_instantiated, terminus};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeAlgorithm {
    Nearest,
    Bilinear,
    Bicubic,
    #[default]
    Lanczos3,
}

/// Per-handle settings, fixed at construction and inherited by split-out handles.
#[derive(Debug, Clone, PartialEq)]
pub struct MagickConfig {
    /// JPEG encode quality, 1..=100.
    pub quality: u8,
    pub algorithm: ResizeAlgorithm,
    /// Decoded frames larger than this are rejected.
    pub max_dimensions: Option<(u32, u32)>,
    /// Run PNG output through oxipng.
    pub optimize_png: bool,
}

impl Default for MagickConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            algorithm: ResizeAlgorithm::Lanczos3,
            max_dimensions: Some((100_000, 100_000)),
            optimize_png: false,
        }
    }
}

impl MagickConfig {
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(MagickError::Input(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        if let Some((w, h)) = self.max_dimensions {
            if w == 0 || h == 0 {
                return Err(MagickError::Input(
                    "Maximum dimensions must be non-zero".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Operation error when a produced frame would exceed `max_dimensions`.
    pub fn check_output_size(&self, width: u32, height: u32) -> Result<()> {
        match self.max_dimensions {
            Some((max_w, max_h)) if width > max_w || height > max_h => {
                Err(MagickError::Operation(format!(
                    "Output dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )))
            }
            _ => Ok(()),
        }
    }
}

/// The caller-visible classification of a [`MagickError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Input,
    Operation,
    State,
}

#[derive(Error, Debug)]
pub enum MagickError {
    /// Malformed geometry or color string.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Missing file, empty or undecodable blob, unknown format.
    #[error("Input error: {0}")]
    Input(String),

    /// The backend refused an otherwise well-formed request.
    #[error("Operation error: {0}")]
    Operation(String),

    /// Destroyed or empty handle.
    #[error("State error: {0}")]
    State(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MagickError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MagickError::Parse(_) => ErrorKind::Parse,
            MagickError::Input(_) => ErrorKind::Input,
            MagickError::Operation(_) | MagickError::Io(_) => ErrorKind::Operation,
            MagickError::State(_) => ErrorKind::State,
        }
    }
}

pub type Result<T> = std::result::Result<T, MagickError>;

pub fn validate_config(config: &MagickConfig) -> Result<()> {
    config.validate()
}
