// photowall: core state machines for a browser-style photo console.
//
// Incremental gallery loading, a location index keyed by reverse-geocoded
// labels, free-text/location filtering and a zoomable photo viewport.
// The crate models an abstract scrollable viewport (scroll offsets, client
// dimensions) and an abstract raster surface; UI toolkits and transports
// live in the embedding application.

use chrono::{DateTime, Utc};

pub mod config;
pub mod gallery;
pub mod geocode;
pub mod loader;
pub mod location_index;
pub mod raster;
pub mod search;
pub mod store;
pub mod viewport;

/// GPS fix attached to a photo, decimal degrees plus altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsPosition {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl GpsPosition {
    /// Consumer cameras write (0, 0) when no fix was available, so that
    /// coordinate is treated as "no GPS" rather than the Gulf of Guinea.
    pub fn has_fix(&self) -> bool {
        (self.lat != 0.0 || self.lon != 0.0)
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Snapshot of a photo as served by the photo store. Immutable once fetched;
/// the server owns the canonical record.
#[derive(Debug, Clone)]
pub struct PhotoRecord {
    /// Opaque unique identifier.
    pub id: String,
    pub name: String,
    pub description: String,
    pub thumbnail: Vec<u8>,
    pub full: Vec<u8>,
    pub captured_at: Option<DateTime<Utc>>,
    pub gps: Option<GpsPosition>,
    /// Natural pixel dimensions; 0 when the server has not probed them yet.
    pub width: u32,
    pub height: u32,
    pub camera_make: String,
    pub camera_model: String,
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Capture date the way the gallery displays it, e.g. "3 June 2024 14:05".
/// Text search matches against this exact rendering.
pub fn format_capture_date(ts: &DateTime<Utc>) -> String {
    ts.format("%-d %B %Y %H:%M").to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("photo store request failed: {0}")]
    Store(String),
    #[error("could not decode raster: {0}")]
    Decode(String),
    #[error("could not resize raster: {0}")]
    Resize(String),
    #[error("config: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
