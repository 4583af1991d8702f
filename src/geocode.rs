// Reverse geocoding with a coordinate-keyed cache. A lookup resolves a GPS
// fix to a "<place>, <country>" label; the empty string means the position
// could not be resolved and callers treat it as "no location", never as an
// error.

use rustc_hash::FxHashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::GpsPosition;

/// Resolver behind the cache. Implementations must not fail observably;
/// network errors, timeouts and unresolvable positions all come back as "".
pub trait ReverseGeocoder {
    fn resolve(&self, lat: f64, lon: f64) -> String;
}

// ~11 m per step; photos taken from the same spot share a cache key.
const QUANT_SCALE: f64 = 10_000.0;

/// Memoizes lookups by quantized coordinate. Failures are cached too, so a
/// tile the resolver cannot name is not re-queried for every photo on it.
pub struct GeocodeCache {
    entries: FxHashMap<(i64, i64), String>,
    capacity: usize,
}

impl GeocodeCache {
    pub fn new(capacity: usize) -> Self {
        Self { entries: FxHashMap::default(), capacity: capacity.max(1) }
    }

    fn key(lat: f64, lon: f64) -> (i64, i64) {
        ((lat * QUANT_SCALE).round() as i64, (lon * QUANT_SCALE).round() as i64)
    }

    pub fn lookup(&mut self, lat: f64, lon: f64, geocoder: &dyn ReverseGeocoder) -> String {
        let pos = GpsPosition { lat, lon, alt: 0.0 };
        if !pos.has_fix() {
            return String::new();
        }

        let key = Self::key(lat, lon);
        if let Some(hit) = self.entries.get(&key) {
            return hit.clone();
        }

        let label = geocoder.resolve(lat, lon);
        if self.entries.len() >= self.capacity {
            // Whole-table flush; the cache rebuilds from live lookups.
            self.entries.clear();
        }
        self.entries.insert(key, label.clone());
        label
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Offline resolver backed by the bundled country-boundaries dataset.
/// Produces "Subdivision, Country" where a subdivision is known, otherwise
/// just the country name. Useful when no network geocoder is wired up.
pub struct OfflineGeocoder;

static BOUNDARIES: OnceLock<Option<country_boundaries::CountryBoundaries>> = OnceLock::new();

fn boundaries() -> Option<&'static country_boundaries::CountryBoundaries> {
    BOUNDARIES
        .get_or_init(|| {
            country_boundaries::CountryBoundaries::from_reader(
                country_boundaries::BOUNDARIES_ODBL_360X180,
            )
            .ok()
        })
        .as_ref()
}

impl ReverseGeocoder for OfflineGeocoder {
    fn resolve(&self, lat: f64, lon: f64) -> String {
        let Some(bounds) = boundaries() else { return String::new() };
        let Ok(pos) = country_boundaries::LatLon::new(lat, lon) else {
            return String::new();
        };

        let ids = bounds.ids(pos);
        if ids.is_empty() {
            // Open ocean, poles, etc.
            return String::new();
        }

        // Ids look like "US-FL" (subdivision) and "US" (country)
        let subdivision_id = ids.iter().find(|id| id.contains('-')).map(|s| s.as_ref());
        let country_id = ids.iter().find(|id| id.len() == 2).map(|s| s.as_ref());

        format_label(country_id, subdivision_id).unwrap_or_default()
    }
}

/// Build the display label from ISO codes, e.g. ("FI", None) -> "Finland",
/// ("US", "US-FL") -> "Florida, United States of America (the)".
fn format_label(country_code: Option<&str>, subdivision_code: Option<&str>) -> Option<String> {
    let place = subdivision_code.and_then(|code| {
        // The codes crate expects underscores (US_FL), not hyphens (US-FL)
        let formatted = code.replace('-', "_");
        codes_iso_3166::part_2::SubdivisionCode::from_str(&formatted)
            .ok()
            .map(|s| s.name().to_string())
    });

    let country = country_code.and_then(|code| {
        codes_iso_3166::part_1::CountryCode::from_str(code)
            .ok()
            .map(|c| c.short_name().to_string())
    });

    match (country, place) {
        (Some(country), Some(place)) => Some(format!("{}, {}", place, country)),
        (Some(country), None) => Some(country),
        (None, Some(place)) => Some(place),
        (None, None) => country_code.or(subdivision_code).map(|s| s.to_string()),
    }
}
