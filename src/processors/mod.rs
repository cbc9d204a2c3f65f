// magick/src/processors/mod.rs
mod backend;
mod compressor;
mod effects;
mod loader;
mod metadata;
mod rasterizer;
mod resizer;
mod rust_backend;

pub use backend::{Backend, Decoded, ShadowLayout, ShadowParams};
pub use compressor::Compressor;
pub use effects::CompositeOp;
pub use loader::Loader;
pub use metadata::MetadataProcessor;
pub use rasterizer::Rasterizer;
pub use resizer::Resizer;
pub use rust_backend::RustBackend;
