use crate::map::polygon::Bounds;
use std::collections::HashMap;

/// Bounding-box index over country features.
///
/// Each feature is inserted into every cell its bounds overlap, so a query
/// never misses a feature but may return ones that only share a cell
/// (callers follow up with an exact test).
#[derive(Debug)]
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounds; feature `i` is the i-th item of `bounds`
    pub fn build<'a>(bounds: impl Iterator<Item = &'a Bounds>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, b) in bounds.enumerate() {
            if b.is_empty() {
                continue;
            }
            let min_cell = grid.to_cell(b.min.x, b.min.y);
            let max_cell = grid.to_cell(b.max.x, b.max.y);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Candidate features whose cell contains the point
    pub fn query_point(&self, lon: f64, lat: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(lon, lat))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Candidate features overlapping `area`, sorted and deduplicated
    pub fn query_bounds(&self, area: &Bounds) -> Vec<usize> {
        let mut results = Vec::new();
        if area.is_empty() {
            return results;
        }
        let min_cell = self.to_cell(area.min.x, area.min.y);
        let max_cell = self.to_cell(area.max.x, area.max.y);
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                if let Some(indices) = self.cells.get(&(x, y)) {
                    results.extend_from_slice(indices);
                }
            }
        }
        results.sort_unstable();
        results.dedup();
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn bounds(x0: f64, y0: f64, x1: f64, y1: f64) -> Bounds {
        Bounds {
            min: DVec2::new(x0, y0),
            max: DVec2::new(x1, y1),
        }
    }

    #[test]
    fn test_point_query_finds_overlapping_features() {
        let items = [bounds(0.0, 0.0, 25.0, 5.0), bounds(30.0, 30.0, 35.0, 35.0)];
        let grid = FeatureGrid::build(items.iter(), 10.0);
        assert_eq!(grid.query_point(22.0, 1.0), &[0]);
        assert_eq!(grid.query_point(31.0, 31.0), &[1]);
        assert!(grid.query_point(-50.0, -50.0).is_empty());
    }

    #[test]
    fn test_bounds_query_dedups() {
        let items = [bounds(0.0, 0.0, 25.0, 25.0), bounds(5.0, 5.0, 6.0, 6.0)];
        let grid = FeatureGrid::build(items.iter(), 10.0);
        assert_eq!(grid.query_bounds(&bounds(-5.0, -5.0, 30.0, 30.0)), vec![0, 1]);
        assert!(grid.query_bounds(&Bounds::EMPTY).is_empty());
    }
}
