//! Density heatmaps for geographic point data.
//!
//! Points are binned into discrete spatial cells (rectangular geohash or
//! hexagonal H3), per-cell counts are ranked, ranks pick colors under one
//! of three schemes, and the colored cell polygons are handed to a
//! [`MapRenderer`] as a semi-transparent overlay.
//!
//! ```no_run
//! use heatfall::{plot_heat_hashes, ColorScheme, FlatMapRenderer, PlotOptions};
//!
//! let lats = [27.88, 27.92, 27.94];
//! let lons = [-82.49, -82.49, -82.46];
//! let image = plot_heat_hashes(
//!     &FlatMapRenderer::default(),
//!     &lats,
//!     &lons,
//!     5,
//!     &ColorScheme::Distinct,
//!     &PlotOptions::default(),
//! )?;
//! image.save("heatmap.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color;
pub mod density;
pub mod error;
pub mod geo;
pub mod grid;
pub mod heatmap;
pub mod render;

pub use color::{ColorScheme, DEFAULT_FILL_ALPHA};
pub use density::DensityMap;
pub use error::HeatfallError;
pub use geo::GeoPoint;
pub use grid::{CellGrid, CellId, GeohashGrid, HexGrid, Tessellation};
pub use heatmap::{heat_overlay, plot_heat_cells, plot_heat_h3s, plot_heat_hashes, PlotOptions};
pub use render::{Canvas, FilledPolygon, FlatMapRenderer, MapRenderer};
