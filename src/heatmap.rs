//! Heatmap orchestration: bin, aggregate, rank, color, resolve geometry,
//! hand the overlay to a renderer.

use image::RgbaImage;
use log::debug;

use crate::color::{ColorScheme, DEFAULT_FILL_ALPHA};
use crate::density::DensityMap;
use crate::error::HeatfallError;
use crate::geo::GeoPoint;
use crate::grid::Tessellation;
use crate::render::{FilledPolygon, MapRenderer};

/// Knobs shared by the plotting entry points.
#[derive(Debug, Clone, Copy)]
pub struct PlotOptions {
    /// Output raster size in pixels (width, height).
    pub size: (u32, u32),
    /// Uniform overlay opacity applied to every cell color.
    pub alpha: u8,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            size: (800, 500),
            alpha: DEFAULT_FILL_ALPHA,
        }
    }
}

/// The pure core of the pipeline: turn a validated point batch into
/// (polygon, color) pairs, one per occupied cell, in ascending cell-id
/// order.
///
/// Fails with the originating error of whichever step breaks; no partial
/// overlay is returned.
pub fn heat_overlay(
    points: &[GeoPoint],
    tessellation: Tessellation,
    scheme: &ColorScheme,
    alpha: u8,
) -> Result<Vec<FilledPolygon>, HeatfallError> {
    let grid = tessellation.grid()?;
    let density = DensityMap::from_points(points, grid.as_ref())?;
    let ramp = scheme.ramp(density.levels().len(), alpha);

    let mut overlay = Vec::with_capacity(density.cell_count());
    for (cell, count) in density.cells_by_id() {
        let color = density
            .rank(count)
            .and_then(|rank| ramp.get(rank).copied())
            .ok_or_else(|| HeatfallError::UnknownCell(cell.to_string()))?;
        overlay.push(FilledPolygon {
            vertices: grid.boundary(cell)?,
            color,
        });
    }

    debug!(
        "heat overlay: {} cells, {} density levels, {:?} tessellation",
        overlay.len(),
        density.levels().len(),
        tessellation
    );
    Ok(overlay)
}

/// Full pipeline against an injected renderer: validate, build the overlay,
/// submit every cell polygon, rasterize.
pub fn plot_heat_cells<R: MapRenderer>(
    renderer: &R,
    lats: &[f64],
    lons: &[f64],
    tessellation: Tessellation,
    scheme: &ColorScheme,
    options: &PlotOptions,
) -> Result<RgbaImage, HeatfallError> {
    let points = GeoPoint::from_series(lats, lons)?;
    let overlay = heat_overlay(&points, tessellation, scheme, options.alpha)?;

    let mut canvas = renderer.new_canvas(options.size);
    for polygon in &overlay {
        renderer.add_filled_polygon(&mut canvas, &polygon.vertices, polygon.color);
    }
    renderer.render(&canvas, options.size.0, options.size.1)
}

/// Geohash-binned heatmap, precision 1-12.
pub fn plot_heat_hashes<R: MapRenderer>(
    renderer: &R,
    lats: &[f64],
    lons: &[f64],
    precision: u8,
    scheme: &ColorScheme,
    options: &PlotOptions,
) -> Result<RgbaImage, HeatfallError> {
    plot_heat_cells(
        renderer,
        lats,
        lons,
        Tessellation::Geohash { precision },
        scheme,
        options,
    )
}

/// H3-binned heatmap, resolution 0-15.
pub fn plot_heat_h3s<R: MapRenderer>(
    renderer: &R,
    lats: &[f64],
    lons: &[f64],
    resolution: u8,
    scheme: &ColorScheme,
    options: &PlotOptions,
) -> Result<RgbaImage, HeatfallError> {
    plot_heat_cells(
        renderer,
        lats,
        lons,
        Tessellation::H3 { resolution },
        scheme,
        options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_pairs_every_occupied_cell() {
        let points = GeoPoint::from_series(
            &[27.88, 27.88, 27.92],
            &[-82.49, -82.49, -82.49],
        )
        .unwrap();
        let overlay = heat_overlay(
            &points,
            Tessellation::Geohash { precision: 5 },
            &ColorScheme::Distinct,
            255,
        )
        .unwrap();
        assert_eq!(overlay.len(), 2);
        // Geohash cells are 4-corner rings.
        assert!(overlay.iter().all(|p| p.vertices.len() == 4));
    }

    #[test]
    fn test_overlay_is_deterministic() {
        let points =
            GeoPoint::from_series(&[27.88, 27.92, 27.94], &[-82.49, -82.49, -82.46]).unwrap();
        let a = heat_overlay(
            &points,
            Tessellation::H3 { resolution: 8 },
            &ColorScheme::Wheel,
            160,
        )
        .unwrap();
        let b = heat_overlay(
            &points,
            Tessellation::H3 { resolution: 8 },
            &ColorScheme::Wheel,
            160,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_overlay_propagates_precision_error() {
        let points = GeoPoint::from_series(&[27.88], &[-82.49]).unwrap();
        assert!(matches!(
            heat_overlay(
                &points,
                Tessellation::Geohash { precision: 0 },
                &ColorScheme::Distinct,
                255,
            ),
            Err(HeatfallError::InvalidPrecision { .. })
        ));
    }
}
