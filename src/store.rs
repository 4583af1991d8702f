// Boundary to the photo server. The core holds immutable record snapshots
// once fetched; failures surface to the caller and are never retried here.

use crate::{PhotoRecord, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Thumbnail,
    Full,
}

pub trait PhotoStore {
    /// The full ordered id sequence. A failure is shown as an empty gallery.
    fn fetch_photo_ids(&self) -> Result<Vec<String>>;

    fn fetch_photo_record(&self, photo_id: &str, resolution: Resolution) -> Result<PhotoRecord>;

    /// Fit a raster into the given bounds before display, preserving the
    /// aspect ratio. Local stores can delegate to
    /// [`crate::raster::fit_to_viewport`].
    fn resize_raster(&self, bytes: &[u8], max_width: u32, max_height: u32) -> Result<Vec<u8>>;
}
