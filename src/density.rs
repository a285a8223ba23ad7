//! Per-cell point counting and density ranking.

use std::collections::HashMap;

use log::debug;

use crate::error::HeatfallError;
use crate::geo::GeoPoint;
use crate::grid::{CellGrid, CellId};

/// Point counts per occupied cell, plus the ascending table of distinct
/// counts that drives color selection.
///
/// A cell's *rank* is the position of its count within that table. Ranks —
/// not raw counts — pick colors, so the color scale adapts to the value
/// distribution actually present instead of a fixed numeric range. Equal
/// counts share a rank.
#[derive(Debug, Clone)]
pub struct DensityMap {
    counts: HashMap<CellId, usize>,
    levels: Vec<usize>,
}

impl DensityMap {
    /// Bin every point through `grid` and tally per-cell counts.
    ///
    /// Fails with [`HeatfallError::EmptyInput`] when there is nothing to
    /// aggregate. The sum of all counts equals `points.len()`.
    pub fn from_points(
        points: &[GeoPoint],
        grid: &dyn CellGrid,
    ) -> Result<Self, HeatfallError> {
        if points.is_empty() {
            return Err(HeatfallError::EmptyInput);
        }

        let mut counts: HashMap<CellId, usize> = HashMap::new();
        for &point in points {
            *counts.entry(grid.cell(point)?).or_insert(0) += 1;
        }

        let mut levels: Vec<usize> = counts.values().copied().collect();
        levels.sort_unstable();
        levels.dedup();

        debug!(
            "binned {} points into {} cells ({} density levels)",
            points.len(),
            counts.len(),
            levels.len()
        );

        Ok(Self { counts, levels })
    }

    /// Per-cell point counts. Every present key has count >= 1; cells with
    /// zero points are never materialized.
    pub fn counts(&self) -> &HashMap<CellId, usize> {
        &self.counts
    }

    /// Distinct counts observed, ascending. Its length is the number of
    /// density levels, at most the number of occupied cells.
    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    /// Rank of a count within [`levels`](Self::levels), or `None` for a
    /// count that no cell has.
    pub fn rank(&self, count: usize) -> Option<usize> {
        self.levels.binary_search(&count).ok()
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.counts.len()
    }

    /// Number of points aggregated.
    pub fn point_count(&self) -> usize {
        self.counts.values().sum()
    }

    /// Occupied cells in ascending id order — the stable order the overlay
    /// is emitted in.
    pub fn cells_by_id(&self) -> Vec<(&CellId, usize)> {
        let mut cells: Vec<(&CellId, usize)> =
            self.counts.iter().map(|(id, &n)| (id, n)).collect();
        cells.sort_by(|a, b| a.0.cmp(b.0));
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GeohashGrid;

    fn points(coords: &[(f64, f64)]) -> Vec<GeoPoint> {
        coords
            .iter()
            .map(|&(lat, lon)| GeoPoint::new(lat, lon).unwrap())
            .collect()
    }

    #[test]
    fn test_counts_sum_to_point_total() {
        let grid = GeohashGrid::new(5).unwrap();
        let pts = points(&[
            (27.88, -82.49),
            (27.88, -82.49),
            (27.92, -82.49),
            (27.94, -82.46),
        ]);
        let density = DensityMap::from_points(&pts, &grid).unwrap();
        assert_eq!(density.point_count(), 4);
    }

    #[test]
    fn test_duplicate_points_share_a_cell() {
        let grid = GeohashGrid::new(5).unwrap();
        let pts = points(&[(27.88, -82.49), (27.88, -82.49), (27.92, -82.49)]);
        let density = DensityMap::from_points(&pts, &grid).unwrap();
        assert_eq!(density.cell_count(), 2);
        assert_eq!(density.levels(), &[1, 2]);
    }

    #[test]
    fn test_ranks_are_monotonic_and_shared() {
        let grid = GeohashGrid::new(5).unwrap();
        // Three cells at counts 1, 1 and 3: two distinct levels.
        let pts = points(&[
            (27.88, -82.49),
            (27.88, -82.49),
            (27.88, -82.49),
            (27.92, -82.49),
            (27.94, -82.46),
        ]);
        let density = DensityMap::from_points(&pts, &grid).unwrap();
        assert_eq!(density.levels(), &[1, 3]);
        assert_eq!(density.rank(1), Some(0));
        assert_eq!(density.rank(3), Some(1));
        assert_eq!(density.rank(2), None);
    }

    #[test]
    fn test_empty_input_fails() {
        let grid = GeohashGrid::new(5).unwrap();
        assert!(matches!(
            DensityMap::from_points(&[], &grid),
            Err(HeatfallError::EmptyInput)
        ));
    }

    #[test]
    fn test_cells_by_id_is_sorted() {
        let grid = GeohashGrid::new(5).unwrap();
        let pts = points(&[(27.94, -82.46), (27.88, -82.49), (27.92, -82.49)]);
        let density = DensityMap::from_points(&pts, &grid).unwrap();
        let cells = density.cells_by_id();
        assert_eq!(cells.len(), 3);
        assert!(cells.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_reaggregation_round_trip() {
        let grid = GeohashGrid::new(5).unwrap();
        let pts = points(&[
            (27.88, -82.49),
            (27.88, -82.49),
            (27.92, -82.49),
            (27.94, -82.46),
        ]);
        let density = DensityMap::from_points(&pts, &grid).unwrap();

        // Replay each cell's SW corner `count` times; the corner of a
        // geohash bbox bins back into the same cell.
        let mut replayed = Vec::new();
        for (cell, count) in density.cells_by_id() {
            let ring = grid.boundary(cell).unwrap();
            let sw = GeoPoint::new(ring[0].lat(), ring[0].lon()).unwrap();
            replayed.extend(std::iter::repeat_n(sw, count));
        }
        let rebuilt = DensityMap::from_points(&replayed, &grid).unwrap();
        assert_eq!(rebuilt.counts(), density.counts());
    }
}
