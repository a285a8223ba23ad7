//! Spatial grids: point → cell binning and cell → boundary resolution.
//!
//! Two tessellations share one capability contract: rectangular geohash
//! cells and hexagonal H3 cells. A [`Tessellation`] value selects the grid
//! once at the API boundary; everything downstream works against the
//! [`CellGrid`] trait and never branches on the kind again.

use std::fmt;

use geohash::Coord;
use h3o::{CellIndex, LatLng, Resolution};

use crate::error::HeatfallError;
use crate::geo::GeoPoint;

/// Smallest usable geohash precision (one base-32 character).
pub const GEOHASH_MIN_PRECISION: u8 = 1;
/// Largest usable geohash precision (twelve base-32 characters).
pub const GEOHASH_MAX_PRECISION: u8 = 12;

/// Grid selector: which tessellation, at which precision.
///
/// Higher precision/resolution means smaller cells. The numeric ranges are
/// validated in [`Tessellation::grid`], not at construction, so a selector
/// can be built freely from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tessellation {
    /// Rectangular geohash cells, precision 1-12.
    Geohash { precision: u8 },
    /// Hexagonal H3 cells, resolution 0-15.
    H3 { resolution: u8 },
}

impl Tessellation {
    /// Resolve the selector into a concrete grid, validating the precision.
    pub fn grid(&self) -> Result<Box<dyn CellGrid>, HeatfallError> {
        match *self {
            Tessellation::Geohash { precision } => {
                Ok(Box::new(GeohashGrid::new(precision)?))
            }
            Tessellation::H3 { resolution } => Ok(Box::new(HexGrid::new(resolution)?)),
        }
    }
}

/// Stable identifier of one occupied cell.
///
/// Two points binned into the same cell at the same precision always yield
/// equal ids; ids from different precisions are unrelated. The `Ord` impl
/// gives the overlay a deterministic emission order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellId {
    /// Base-32 geohash string, e.g. `"dhvq"`.
    Geohash(String),
    /// 64-bit H3 index.
    Hex(CellIndex),
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellId::Geohash(hash) => f.write_str(hash),
            CellId::Hex(index) => write!(f, "{index}"),
        }
    }
}

/// One tessellation scheme: bins points into cells and resolves cell ids
/// back to the boundary polygon used for rendering.
///
/// Both operations are pure. For any valid point, the polygon returned for
/// its own cell contains the point (boundary-inclusive).
pub trait CellGrid {
    /// Assign a point to its cell.
    fn cell(&self, point: GeoPoint) -> Result<CellId, HeatfallError>;

    /// Resolve a cell id to its boundary ring, in (lat, lon) degrees.
    ///
    /// The ring is open: the first vertex implicitly connects to the last.
    /// Ids that are malformed, or that belong to the other tessellation,
    /// fail with [`HeatfallError::UnknownCell`].
    fn boundary(&self, cell: &CellId) -> Result<Vec<GeoPoint>, HeatfallError>;
}

/// Rectangular grid over base-32 geohash cells.
#[derive(Debug, Clone, Copy)]
pub struct GeohashGrid {
    precision: usize,
}

impl GeohashGrid {
    pub fn new(precision: u8) -> Result<Self, HeatfallError> {
        if !(GEOHASH_MIN_PRECISION..=GEOHASH_MAX_PRECISION).contains(&precision) {
            return Err(HeatfallError::InvalidPrecision {
                kind: "geohash",
                precision,
                min: GEOHASH_MIN_PRECISION,
                max: GEOHASH_MAX_PRECISION,
            });
        }
        Ok(Self {
            precision: precision as usize,
        })
    }

    pub fn precision(&self) -> u8 {
        self.precision as u8
    }
}

impl CellGrid for GeohashGrid {
    fn cell(&self, point: GeoPoint) -> Result<CellId, HeatfallError> {
        let coord = Coord {
            x: point.lon(),
            y: point.lat(),
        };
        geohash::encode(coord, self.precision)
            .map(CellId::Geohash)
            .map_err(|_| HeatfallError::InvalidCoordinate {
                lat: point.lat(),
                lon: point.lon(),
            })
    }

    fn boundary(&self, cell: &CellId) -> Result<Vec<GeoPoint>, HeatfallError> {
        let CellId::Geohash(hash) = cell else {
            return Err(HeatfallError::UnknownCell(cell.to_string()));
        };
        // decode_bbox maps "" to the whole-world rect; an id with no
        // characters names no cell.
        if hash.is_empty() || hash.len() > GEOHASH_MAX_PRECISION as usize {
            return Err(HeatfallError::UnknownCell(hash.clone()));
        }
        let rect = geohash::decode_bbox(hash)
            .map_err(|_| HeatfallError::UnknownCell(hash.clone()))?;
        let (west, south) = (rect.min().x, rect.min().y);
        let (east, north) = (rect.max().x, rect.max().y);
        // SW -> NW -> NE -> SE; the ring closes back onto SW implicitly.
        Ok(vec![
            GeoPoint::new_unchecked(south, west),
            GeoPoint::new_unchecked(north, west),
            GeoPoint::new_unchecked(north, east),
            GeoPoint::new_unchecked(south, east),
        ])
    }
}

/// Hexagonal grid over H3 cells.
#[derive(Debug, Clone, Copy)]
pub struct HexGrid {
    resolution: Resolution,
}

impl HexGrid {
    pub fn new(resolution: u8) -> Result<Self, HeatfallError> {
        let resolution =
            Resolution::try_from(resolution).map_err(|_| HeatfallError::InvalidPrecision {
                kind: "H3",
                precision: resolution,
                min: 0,
                max: 15,
            })?;
        Ok(Self { resolution })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}

impl CellGrid for HexGrid {
    fn cell(&self, point: GeoPoint) -> Result<CellId, HeatfallError> {
        let latlng =
            LatLng::new(point.lat(), point.lon()).map_err(|_| HeatfallError::InvalidCoordinate {
                lat: point.lat(),
                lon: point.lon(),
            })?;
        Ok(CellId::Hex(latlng.to_cell(self.resolution)))
    }

    fn boundary(&self, cell: &CellId) -> Result<Vec<GeoPoint>, HeatfallError> {
        let CellId::Hex(index) = cell else {
            return Err(HeatfallError::UnknownCell(cell.to_string()));
        };
        // Hexagons yield 6 vertices; the 12 pentagon cells per resolution
        // yield 5, plus up to 4 distortion vertices where the boundary
        // crosses icosahedron edges. All are valid rings.
        Ok(index
            .boundary()
            .iter()
            .map(|vertex| {
                GeoPoint::new_unchecked(
                    vertex.lat_radians().to_degrees(),
                    vertex.lng_radians().to_degrees(),
                )
            })
            .collect())
    }
}
