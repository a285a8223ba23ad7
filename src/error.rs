//! Error types for the heatmap pipeline.

use thiserror::Error;

/// Errors surfaced by binning, aggregation, coloring and rendering.
///
/// Every failure is reported eagerly, before any partial work is kept;
/// callers never see a half-built overlay.
#[derive(Debug, Error)]
pub enum HeatfallError {
    /// Latitude or longitude outside the valid decimal-degree range.
    #[error("invalid coordinate ({lat}, {lon}): latitudes must be between -90 and 90, longitudes must be between -180 and 180")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Precision outside the valid range for the selected grid.
    #[error("{kind} precision must be {min}-{max} (got {precision})")]
    InvalidPrecision {
        kind: &'static str,
        precision: u8,
        min: u8,
        max: u8,
    },

    /// No points were supplied; there is nothing to plot.
    #[error("lats and lons cannot be empty")]
    EmptyInput,

    /// The latitude and longitude series disagree on length.
    #[error("lats and lons must have same length (got {lats} and {lons})")]
    LengthMismatch { lats: usize, lons: usize },

    /// Color scheme name not one of "distinct", "random", "wheel".
    #[error("unknown color scheme {0:?} (expected \"distinct\", \"random\" or \"wheel\")")]
    InvalidScheme(String),

    /// A cell id that is not well-formed for the grid resolving it.
    ///
    /// Unreachable through the public plotting path; seeing it there means
    /// an internal invariant was violated.
    #[error("not a valid cell id for this grid: {0}")]
    UnknownCell(String),

    /// Failure inside an injected [`MapRenderer`](crate::MapRenderer).
    ///
    /// The bundled flat renderer never fails; this is the surface for
    /// renderers with real collaborators (tile fetch, encoders).
    #[error("renderer failure: {0}")]
    Render(String),
}
