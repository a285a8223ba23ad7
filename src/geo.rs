//! Validated geographic points and parallel-series intake.

use crate::error::HeatfallError;

/// A (latitude, longitude) pair in decimal degrees.
///
/// Constructed only through [`GeoPoint::new`] or [`GeoPoint::from_series`],
/// so a `GeoPoint` held anywhere downstream is already range-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Create a point, rejecting out-of-range or non-finite coordinates.
    pub fn new(lat: f64, lon: f64) -> Result<Self, HeatfallError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(HeatfallError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Construct without range checks. Reserved for coordinates that are
    /// valid by construction, e.g. cell corners decoded from a grid.
    pub(crate) fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in decimal degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Build a point batch from parallel latitude/longitude slices.
    ///
    /// Validation order matches the plotting entry points: length mismatch,
    /// then emptiness, then per-coordinate range checks. All checks happen
    /// here, before any binning work starts.
    pub fn from_series(lats: &[f64], lons: &[f64]) -> Result<Vec<GeoPoint>, HeatfallError> {
        if lats.len() != lons.len() {
            return Err(HeatfallError::LengthMismatch {
                lats: lats.len(),
                lons: lons.len(),
            });
        }
        if lats.is_empty() {
            return Err(HeatfallError::EmptyInput);
        }
        lats.iter()
            .zip(lons)
            .map(|(&lat, &lon)| GeoPoint::new(lat, lon))
            .collect()
    }
}
