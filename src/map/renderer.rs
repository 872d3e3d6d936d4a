use crate::braille::BrailleCanvas;
use crate::map::geometry::draw_polyline;
use crate::map::projection::Viewport;
use crate::map::world::World;
use rayon::prelude::*;

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_borders: bool,
    pub show_legend: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_borders: true,
            show_legend: true,
        }
    }
}

/// One rendered frame of the map, in character cells
pub struct MapLayers {
    pub width: u16,
    pub height: u16,
    /// Country index under each cell centre, row-major
    pub cells: Vec<Option<usize>>,
    /// Country outlines
    pub borders: BrailleCanvas,
}

impl MapLayers {
    pub fn country_at_cell(&self, cx: u16, cy: u16) -> Option<usize> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        self.cells[cy as usize * self.width as usize + cx as usize]
    }
}

/// Everything a rendered frame depends on besides the (immutable) world
#[derive(Clone, Debug, PartialEq)]
struct LayerKey {
    width: u16,
    height: u16,
    center_lon: f64,
    center_lat: f64,
    zoom: f64,
    show_borders: bool,
}

/// Rasterises the world into cell fills plus Braille borders
pub struct MapRenderer {
    pub settings: DisplaySettings,
    cache: Option<(LayerKey, MapLayers)>,
    /// Number of rasterisations done, for cache checks
    generation: u64,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            settings: DisplaySettings::default(),
            cache: None,
            generation: 0,
        }
    }

    /// Layers for the current view, re-rendered only when size, viewport or
    /// border setting changed since the last call
    pub fn layers(&mut self, world: &World, width: u16, height: u16, viewport: &Viewport) -> &MapLayers {
        let key = LayerKey {
            width,
            height,
            center_lon: viewport.center_lon,
            center_lat: viewport.center_lat,
            zoom: viewport.zoom,
            show_borders: self.settings.show_borders,
        };
        if self.cache.as_ref().is_some_and(|(k, _)| *k != key) {
            self.cache = None;
        }
        let settings = &self.settings;
        let generation = &mut self.generation;
        let (_, layers) = self.cache.get_or_insert_with(|| {
            *generation += 1;
            (key, rasterize(settings, world, width, height, viewport))
        });
        layers
    }

    /// Layers from the last `layers` call, if any
    pub fn cached(&self) -> Option<&MapLayers> {
        self.cache.as_ref().map(|(_, layers)| layers)
    }

    pub fn toggle_borders(&mut self) {
        self.settings.show_borders = !self.settings.show_borders;
    }

    pub fn toggle_legend(&mut self) {
        self.settings.show_legend = !self.settings.show_legend;
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `world` into a `width` x `height` character area
fn rasterize(
    settings: &DisplaySettings,
    world: &World,
    width: u16,
    height: u16,
    viewport: &Viewport,
) -> MapLayers {
    let cells = fill_cells(world, width, height, viewport);

    let mut borders = BrailleCanvas::new(width as usize, height as usize);
    if settings.show_borders {
        for idx in world.visible(&viewport.visible_bounds()) {
            for polygon in &world.countries()[idx].polygons {
                for ring in polygon.rings() {
                    draw_polyline(&mut borders, ring.iter().map(|p| viewport.project(p.x, p.y)));
                }
            }
        }
    }

    MapLayers {
        width,
        height,
        cells,
        borders,
    }
}

/// Hit-test every cell centre against the world, rows in parallel
pub fn fill_cells(world: &World, width: u16, height: u16, viewport: &Viewport) -> Vec<Option<usize>> {
    (0..height)
        .into_par_iter()
        .flat_map_iter(|cy| {
            (0..width).map(move |cx| {
                let (lon, lat) = viewport.cell_center(cx, cy);
                world.country_at(lon, lat)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::world::box_country;

    #[test]
    fn test_cells_pick_up_country() {
        // One big country covering the eastern hemisphere's tropics
        let world = World::new(vec![box_country("East", (0.0, -30.0), (180.0, 30.0))]);
        let vp = Viewport::new(0.0, 0.0, 1.0, 80, 40);
        let mut renderer = MapRenderer::new();
        let layers = renderer.layers(&world, 40, 10, &vp);

        assert_eq!(layers.cells.len(), 400);
        // Right of centre on the equator row
        assert_eq!(layers.country_at_cell(30, 5), Some(0));
        // Left of centre is the western hemisphere
        assert_eq!(layers.country_at_cell(5, 5), None);
        assert_eq!(layers.country_at_cell(99, 99), None);
    }

    #[test]
    fn test_layers_are_cached_per_view() {
        let world = World::new(vec![box_country("Box", (-20.0, -20.0), (20.0, 20.0))]);
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 80, 40);
        let mut renderer = MapRenderer::new();
        assert!(renderer.cached().is_none());

        renderer.layers(&world, 40, 10, &vp);
        renderer.layers(&world, 40, 10, &vp);
        assert_eq!(renderer.generation, 1);

        vp.zoom_in();
        renderer.layers(&world, 40, 10, &vp);
        assert_eq!(renderer.generation, 2);

        renderer.toggle_borders();
        renderer.layers(&world, 40, 10, &vp);
        renderer.layers(&world, 41, 10, &vp);
        assert_eq!(renderer.generation, 4);
        assert_eq!(renderer.cached().map(|l| l.width), Some(41));
    }

    #[test]
    fn test_borders_toggle() {
        let world = World::new(vec![box_country("Box", (-20.0, -20.0), (20.0, 20.0))]);
        let vp = Viewport::new(0.0, 0.0, 1.0, 80, 40);
        let mut renderer = MapRenderer::new();

        let has_dots = |l: &MapLayers| (0..10).any(|r| (0..40).any(|c| l.borders.glyph(c, r).is_some()));
        assert!(has_dots(renderer.layers(&world, 40, 10, &vp)));

        renderer.toggle_borders();
        assert!(!has_dots(renderer.layers(&world, 40, 10, &vp)));
    }
}
