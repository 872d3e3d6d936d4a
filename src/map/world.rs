use crate::map::polygon::{Bounds, Country};
use crate::map::spatial::FeatureGrid;
use glam::DVec2;
use std::collections::HashMap;

/// Spatial index cell size in degrees
const GRID_CELL_DEGREES: f64 = 10.0;

/// Country polygons with name lookup and a point index
#[derive(Debug)]
pub struct World {
    countries: Vec<Country>,
    by_name: HashMap<String, Vec<usize>>,
    grid: FeatureGrid,
}

impl World {
    pub fn new(countries: Vec<Country>) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, c) in countries.iter().enumerate() {
            by_name.entry(c.name.clone()).or_default().push(idx);
        }
        let grid = FeatureGrid::build(countries.iter().map(|c| &c.bounds), GRID_CELL_DEGREES);
        Self {
            countries,
            by_name,
            grid,
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Feature indices carrying `name` (several features may share a name)
    pub fn indices_of(&self, name: &str) -> &[usize] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Index of the country containing the point, if any
    pub fn country_at(&self, lon: f64, lat: f64) -> Option<usize> {
        self.grid
            .query_point(lon, lat)
            .iter()
            .copied()
            .find(|&idx| self.countries[idx].contains(lon, lat))
    }

    /// Countries whose bounds overlap `area`
    pub fn visible(&self, area: &Bounds) -> Vec<usize> {
        self.grid
            .query_bounds(area)
            .into_iter()
            .filter(|&idx| self.countries[idx].bounds.intersects(area))
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Convenience for tests and benches: an axis-aligned box country
pub fn box_country(name: &str, min: (f64, f64), max: (f64, f64)) -> Country {
    use crate::map::polygon::Polygon;
    let ring = vec![
        DVec2::new(min.0, min.1),
        DVec2::new(max.0, min.1),
        DVec2::new(max.0, max.1),
        DVec2::new(min.0, max.1),
        DVec2::new(min.0, min.1),
    ];
    Country::new(name, vec![Polygon::new(ring, vec![])])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(vec![
            box_country("Iraq", (39.0, 29.0), (48.0, 37.0)),
            box_country("Syria", (35.0, 32.0), (39.0, 37.0)),
            box_country("Chile", (-75.0, -55.0), (-67.0, -17.0)),
        ])
    }

    #[test]
    fn test_country_at() {
        let w = world();
        assert_eq!(w.country_at(44.0, 33.0), Some(0));
        assert_eq!(w.country_at(37.0, 35.0), Some(1));
        assert_eq!(w.country_at(-70.0, -30.0), Some(2));
        assert_eq!(w.country_at(0.0, 0.0), None);
    }

    #[test]
    fn test_indices_of() {
        let w = world();
        assert_eq!(w.indices_of("Syria"), &[1]);
        assert!(w.indices_of("Atlantis").is_empty());
    }

    #[test]
    fn test_visible_filters_by_bounds() {
        let w = world();
        let middle_east = Bounds {
            min: DVec2::new(30.0, 25.0),
            max: DVec2::new(50.0, 40.0),
        };
        assert_eq!(w.visible(&middle_east), vec![0, 1]);
        let everywhere = Bounds {
            min: DVec2::new(-180.0, -90.0),
            max: DVec2::new(180.0, 90.0),
        };
        assert_eq!(w.visible(&everywhere).len(), 3);
    }
}
