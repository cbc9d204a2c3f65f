// magick/src/processors/metadata.rs
use crate::core::{ImageInfo, Result};
use exif::{Exif, In, Reader};
use std::io::Cursor;

/// Property keys carrying embedded EXIF fields start with this.
pub const EXIF_PREFIX: &str = "exif:";

#[derive(Clone, Default)]
pub struct MetadataProcessor;

impl MetadataProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn read_metadata(&self, data: &[u8]) -> Option<Exif> {
        match Reader::new().read_from_container(&mut Cursor::new(data)) {
            Ok(exif) => {
                log::debug!("Found EXIF data ({} fields)", exif.fields().len());
                Some(exif)
            }
            Err(exif::Error::NotFound(_)) => None,
            Err(e) => {
                log::warn!("Failed to read EXIF: {}", e);
                None
            }
        }
    }

    /// Primary-IFD EXIF fields as `exif:<Tag>` properties.
    pub fn read_properties(&self, data: &[u8]) -> Vec<(String, String)> {
        match self.read_metadata(data) {
            Some(exif) => self.extract_properties(&exif),
            None => Vec::new(),
        }
    }

    pub fn extract_properties(&self, exif: &Exif) -> Vec<(String, String)> {
        exif.fields()
            .filter(|field| field.ifd_num == In::PRIMARY)
            .map(|field| {
                (
                    format!("{}{}", EXIF_PREFIX, field.tag),
                    field.display_value().with_unit(exif).to_string(),
                )
            })
            .collect()
    }

    /// Drop embedded profiles and metadata properties. Caller-set properties stay.
    pub fn strip_metadata(&self, info: &mut ImageInfo) -> Result<()> {
        let before = info.properties.len();
        info.properties.retain(|key, _| !key.starts_with(EXIF_PREFIX));
        let had_profile = info.icc_profile.take().is_some();

        log::debug!(
            "Stripped {} metadata properties{}",
            before - info.properties.len(),
            if had_profile { " and ICC profile" } else { "" }
        );
        Ok(())
    }

    pub fn has_metadata(&self, info: &ImageInfo) -> bool {
        info.icc_profile.is_some() || info.properties.keys().any(|k| k.starts_with(EXIF_PREFIX))
    }
}
