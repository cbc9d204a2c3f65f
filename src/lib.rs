//! ImageMagick-style image manipulation: geometry strings in, transformed
//! frame lists out.
//!
//! ```no_run
//! # fn main() -> magick::Result<()> {
//! magick::genesis();
//!
//! let mut image = magick::MagickImage::from_file("photo.png")?;
//! image.resize("100x100>")?;
//! image.shadow("#000", 75.0, 2.0, 0, 0)?;
//! image.fill_background_color("#CCC")?;
//! image.to_file("thumb.jpg")?;
//! image.destroy()?;
//!
//! magick::terminus();
//! # Ok(())
//! # }
//! ```

mod core;
pub mod geometry;
mod processors;
mod utils;

pub use crate::core::{
    genesis, is_instantiated, terminus, validate_config, ErrorKind, Frame, ImageInfo,
    MagickConfig, MagickError, MagickImage, ResizeAlgorithm, Result,
};
pub use geometry::{
    parse_geometry, GeometryFlag, GeometrySpec, Modifier, Region, TileGrid,
};
pub use processors::{
    Backend, CompositeOp, Compressor, Decoded, Loader, MetadataProcessor, Rasterizer, Resizer,
    RustBackend, ShadowLayout, ShadowParams,
};
pub use utils::{format_from_hint, image_format_to_string, parse_color, SourceFormat};

pub mod prelude {
    pub use crate::{
        CompositeOp, GeometrySpec, MagickConfig, MagickError, MagickImage, ResizeAlgorithm,
    };
}

// Re-export commonly used types
pub use image::{DynamicImage, ImageFormat};
