//! Map rendering capability: a recording canvas plus one concrete
//! tile-free renderer.
//!
//! The pipeline core never touches pixels. It submits (polygon, color)
//! pairs to a [`Canvas`] through the [`MapRenderer`] trait; rasterization
//! is whatever the injected renderer does with them. [`FlatMapRenderer`]
//! draws onto a solid background with an equirectangular projection fitted
//! to the overlay extent, which keeps the whole pipeline usable without a
//! tile source.

use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use log::debug;

use crate::error::HeatfallError;
use crate::geo::GeoPoint;

/// A filled cell polygon queued for rendering. The vertex ring is open;
/// the first vertex implicitly closes it.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledPolygon {
    pub vertices: Vec<GeoPoint>,
    pub color: Rgba<u8>,
}

/// Recording surface for overlay submissions.
///
/// Tests inspect [`polygons`](Canvas::polygons) directly instead of
/// decoding pixels, which is the in-memory fake the renderer seam exists
/// for.
#[derive(Debug, Clone)]
pub struct Canvas {
    polygons: Vec<FilledPolygon>,
    size_hint: (u32, u32),
}

impl Canvas {
    pub fn new(size_hint: (u32, u32)) -> Self {
        Self {
            polygons: Vec::new(),
            size_hint,
        }
    }

    /// Submitted polygons, in submission order.
    pub fn polygons(&self) -> &[FilledPolygon] {
        &self.polygons
    }

    pub fn size_hint(&self) -> (u32, u32) {
        self.size_hint
    }
}

/// The external map-drawing capability the overlay is handed to.
///
/// Canvas bookkeeping is shared via default methods; an implementation
/// only decides how to turn a finished canvas into a raster.
pub trait MapRenderer {
    fn new_canvas(&self, size_hint: (u32, u32)) -> Canvas {
        Canvas::new(size_hint)
    }

    fn add_filled_polygon(&self, canvas: &mut Canvas, vertices: &[GeoPoint], color: Rgba<u8>) {
        canvas.polygons.push(FilledPolygon {
            vertices: vertices.to_vec(),
            color,
        });
    }

    /// Rasterize the canvas at the requested output size.
    fn render(&self, canvas: &Canvas, width: u32, height: u32)
    -> Result<RgbaImage, HeatfallError>;
}

/// Tile-free renderer: solid background, equirectangular projection fitted
/// to the padded bounding box of everything submitted.
#[derive(Debug, Clone)]
pub struct FlatMapRenderer {
    /// Background fill behind the overlay.
    pub background: Rgba<u8>,
    /// Fraction of the overlay span added as margin on each side.
    pub padding: f64,
}

impl Default for FlatMapRenderer {
    fn default() -> Self {
        Self {
            background: Rgba([0, 0, 0, 255]),
            padding: 0.05,
        }
    }
}

impl MapRenderer for FlatMapRenderer {
    fn render(
        &self,
        canvas: &Canvas,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, HeatfallError> {
        if width == 0 || height == 0 {
            return Ok(RgbaImage::new(width, height));
        }
        let mut base = RgbaImage::from_pixel(width, height, self.background);
        if canvas.polygons().is_empty() {
            return Ok(base);
        }

        let frame = Frame::fit(canvas.polygons(), self.padding);

        // Cells are drawn opaque into a transparent overlay first; because
        // tessellation cells never overlap, overwrite there is exact, and
        // one blend pass applies each color's own alpha over the base.
        let mut overlay = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        let mut drawn = 0usize;
        let mut skipped = 0usize;

        for polygon in canvas.polygons() {
            if wraps_antimeridian(&polygon.vertices) {
                skipped += 1;
                continue;
            }
            let mut ring: Vec<Point<i32>> = polygon
                .vertices
                .iter()
                .map(|v| frame.to_pixel(*v, width, height))
                .map(|(x, y)| Point::new(x, y))
                .collect();
            ring.dedup();
            if ring.len() > 1 && ring.first() == ring.last() {
                ring.pop();
            }
            if ring.len() < 3 {
                skipped += 1;
                continue;
            }
            draw_polygon_mut(&mut overlay, &ring, polygon.color);
            drawn += 1;
        }

        for (base_px, overlay_px) in base.pixels_mut().zip(overlay.pixels()) {
            base_px.blend(overlay_px);
        }

        debug!(
            "rendered {drawn} polygons onto {width}x{height} raster ({skipped} skipped)"
        );
        Ok(base)
    }
}

/// A cell whose vertices span more than half the globe in longitude is a
/// dateline wrap artifact, not a coherent polygon in this projection.
fn wraps_antimeridian(vertices: &[GeoPoint]) -> bool {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in vertices {
        min = min.min(v.lon());
        max = max.max(v.lon());
    }
    max - min > 180.0
}

/// Linear lat/lon frame mapped onto the output raster, north up.
#[derive(Debug, Clone, Copy)]
struct Frame {
    west: f64,
    north: f64,
    lon_span: f64,
    lat_span: f64,
}

impl Frame {
    const MIN_SPAN: f64 = 1e-9;

    fn fit(polygons: &[FilledPolygon], padding: f64) -> Self {
        let mut west = f64::INFINITY;
        let mut east = f64::NEG_INFINITY;
        let mut south = f64::INFINITY;
        let mut north = f64::NEG_INFINITY;
        for polygon in polygons {
            for v in &polygon.vertices {
                west = west.min(v.lon());
                east = east.max(v.lon());
                south = south.min(v.lat());
                north = north.max(v.lat());
            }
        }
        let lon_pad = (east - west).max(Self::MIN_SPAN) * padding;
        let lat_pad = (north - south).max(Self::MIN_SPAN) * padding;
        Self {
            west: west - lon_pad,
            north: north + lat_pad,
            lon_span: (east - west) + 2.0 * lon_pad,
            lat_span: (north - south) + 2.0 * lat_pad,
        }
    }

    fn to_pixel(&self, point: GeoPoint, width: u32, height: u32) -> (i32, i32) {
        let x = ((point.lon() - self.west) / self.lon_span * width as f64) as i32;
        let y = ((self.north - point.lat()) / self.lat_span * height as f64) as i32;
        (
            x.clamp(0, width as i32 - 1),
            y.clamp(0, height as i32 - 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(lat: f64, lon: f64, size: f64) -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(lat, lon).unwrap(),
            GeoPoint::new(lat + size, lon).unwrap(),
            GeoPoint::new(lat + size, lon + size).unwrap(),
            GeoPoint::new(lat, lon + size).unwrap(),
        ]
    }

    #[test]
    fn test_canvas_records_submissions() {
        let renderer = FlatMapRenderer::default();
        let mut canvas = renderer.new_canvas((800, 500));
        let color = Rgba([10, 20, 30, 160]);
        renderer.add_filled_polygon(&mut canvas, &square(27.0, -82.0, 0.1), color);
        assert_eq!(canvas.polygons().len(), 1);
        assert_eq!(canvas.polygons()[0].color, color);
        assert_eq!(canvas.size_hint(), (800, 500));
    }

    #[test]
    fn test_render_honors_requested_size() {
        let renderer = FlatMapRenderer::default();
        let mut canvas = renderer.new_canvas((800, 500));
        renderer.add_filled_polygon(
            &mut canvas,
            &square(27.0, -82.0, 0.1),
            Rgba([200, 40, 40, 255]),
        );
        let image = renderer.render(&canvas, 320, 240).unwrap();
        assert_eq!(image.dimensions(), (320, 240));
    }

    #[test]
    fn test_render_fills_cell_interior() {
        let renderer = FlatMapRenderer::default();
        let mut canvas = renderer.new_canvas((200, 200));
        renderer.add_filled_polygon(
            &mut canvas,
            &square(27.0, -82.0, 0.1),
            Rgba([200, 40, 40, 255]),
        );
        let image = renderer.render(&canvas, 200, 200).unwrap();
        // A single fitted square covers the frame center.
        let center = image.get_pixel(100, 100);
        assert_eq!(*center, Rgba([200, 40, 40, 255]));
    }

    #[test]
    fn test_semi_transparent_fill_blends_with_background() {
        let renderer = FlatMapRenderer {
            background: Rgba([0, 0, 0, 255]),
            ..FlatMapRenderer::default()
        };
        let mut canvas = renderer.new_canvas((200, 200));
        renderer.add_filled_polygon(
            &mut canvas,
            &square(27.0, -82.0, 0.1),
            Rgba([200, 40, 40, 128]),
        );
        let image = renderer.render(&canvas, 200, 200).unwrap();
        let center = *image.get_pixel(100, 100);
        // Blended toward the background, neither source color nor black.
        assert_ne!(center, Rgba([200, 40, 40, 128]));
        assert_ne!(center, Rgba([0, 0, 0, 255]));
        assert!(center.0[0] > center.0[1]);
    }

    #[test]
    fn test_empty_canvas_renders_background_only() {
        let renderer = FlatMapRenderer::default();
        let canvas = renderer.new_canvas((100, 80));
        let image = renderer.render(&canvas, 100, 80).unwrap();
        assert!(image.pixels().all(|px| *px == renderer.background));
    }

    #[test]
    fn test_wrap_artifact_polygon_is_skipped() {
        let renderer = FlatMapRenderer::default();
        let mut canvas = renderer.new_canvas((100, 100));
        // Vertices jumping across the antimeridian.
        let wrap = vec![
            GeoPoint::new(0.0, 179.5).unwrap(),
            GeoPoint::new(1.0, 179.5).unwrap(),
            GeoPoint::new(1.0, -179.5).unwrap(),
            GeoPoint::new(0.0, -179.5).unwrap(),
        ];
        renderer.add_filled_polygon(&mut canvas, &wrap, Rgba([255, 255, 255, 255]));
        renderer.add_filled_polygon(
            &mut canvas,
            &square(0.0, 10.0, 0.5),
            Rgba([20, 220, 20, 255]),
        );
        let image = renderer.render(&canvas, 100, 100).unwrap();
        // The wrap polygon must not smear white across the raster.
        assert!(image.pixels().all(|px| px.0 != [255, 255, 255, 255]));
    }

    #[test]
    fn test_zero_size_render() {
        let renderer = FlatMapRenderer::default();
        let canvas = renderer.new_canvas((0, 0));
        let image = renderer.render(&canvas, 0, 0).unwrap();
        assert_eq!(image.dimensions(), (0, 0));
    }
}
