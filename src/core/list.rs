// magick/src/core/list.rs
//! Image-list operations on [`MagickImage`].

use super::{MagickImage, Result};
use std::sync::Arc;

impl MagickImage {
    /// Number of frames; 0 once the handle is destroyed.
    pub fn list_length(&self) -> usize {
        self.frames.len()
    }

    /// One independent single-frame handle per frame, in list order.
    ///
    /// Each handle owns a copy of its frame and of the image info, so the
    /// source may be destroyed or mutated afterwards without affecting them.
    pub fn split_list(&self) -> Result<Vec<MagickImage>> {
        let info = self.ensure_live()?;

        let handles: Vec<MagickImage> = self
            .frames
            .iter()
            .map(|frame| MagickImage {
                frames: vec![frame.clone()],
                info: Some(info.clone()),
                config: self.config.clone(),
                backend: Arc::clone(&self.backend),
            })
            .collect();

        log::debug!("Split image list into {} handles", handles.len());
        Ok(handles)
    }
}
