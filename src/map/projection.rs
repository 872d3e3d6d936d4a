use crate::map::polygon::Bounds;
use glam::DVec2;
use std::f64::consts::PI;

/// Latitude limit of Web Mercator; beyond it y diverges
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 100.0;
const ZOOM_STEP: f64 = 1.5;

/// Normalized Web Mercator y in [0, 1] (0 = north edge)
#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[inline(always)]
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Visible map area in Braille pixels (2x4 per character cell)
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (clamped to +/-85)
    pub center_lat: f64,
    /// Zoom level (1 = whole world spans the canvas width)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Whole-world view, nudged north since little is drawn below -60
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, 1.0, width, height)
    }

    /// Resize to a character area
    pub fn set_cells(&mut self, cols: u16, rows: u16) {
        self.width = cols as usize * 2;
        self.height = rows as usize * 4;
    }

    #[inline(always)]
    fn scale(&self) -> f64 {
        self.zoom * self.width as f64
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        if self.width == 0 {
            return;
        }
        let step = 360.0 / self.scale();
        self.center_lon += dx as f64 * step;
        self.center_lat -= dy as f64 * step * 0.5;

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom in keeping the point under (px, py) fixed
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    /// Zoom out keeping the point under (px, py) fixed
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / ZOOM_STEP);
    }

    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        // Pan so the anchor lands back under the cursor
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Pixel coordinates to (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        self.unproject_f(px as f64, py as f64)
    }

    fn unproject_f(&self, px: f64, py: f64) -> (f64, f64) {
        let scale = self.scale();
        let x = (px - self.width as f64 / 2.0) / scale + mercator_x(self.center_lon);
        let y = (py - self.height as f64 / 2.0) / scale + mercator_y(self.center_lat);

        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
        (lon, lat)
    }

    /// (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let scale = self.scale();
        let px = (mercator_x(lon) - mercator_x(self.center_lon)) * scale + self.width as f64 / 2.0;
        let py = (mercator_y(lat) - mercator_y(self.center_lat)) * scale + self.height as f64 / 2.0;
        (px as i32, py as i32)
    }

    /// Geographic point under the centre of character cell (cx, cy)
    pub fn cell_center(&self, cx: u16, cy: u16) -> (f64, f64) {
        self.unproject_f(cx as f64 * 2.0 + 1.0, cy as f64 * 4.0 + 2.0)
    }

    /// Lon/lat box covering the canvas, clamped to the globe
    pub fn visible_bounds(&self) -> Bounds {
        let (lon0, lat0) = self.unproject_f(0.0, self.height as f64);
        let (lon1, lat1) = self.unproject_f(self.width as f64, 0.0);
        Bounds {
            min: DVec2::new(lon0.max(-180.0), lat0.max(-90.0)),
            max: DVec2::new(lon1.min(180.0), lat1.min(90.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_without_area_is_noop() {
        let mut vp = Viewport::world(0, 0);
        vp.pan(10, 10);
        assert_eq!(vp.center_lon, 0.0);
        assert_eq!(vp.center_lat, 20.0);
    }

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        assert_eq!(vp.project(0.0, 0.0), (50, 50));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::new(10.0, 30.0, 3.0, 400, 200);
        let (px, py) = vp.project(12.0, 31.0);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon - 12.0).abs() < 0.5);
        assert!((lat - 31.0).abs() < 0.5);
    }

    #[test]
    fn test_poles_stay_finite() {
        let vp = Viewport::world(200, 100);
        let (_, py) = vp.project(0.0, -90.0);
        assert!(py < 10_000);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
        vp.pan(0, -100_000);
        assert_eq!(vp.center_lat, 85.0);
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 200, 200);
        let before = vp.unproject(150, 80);
        vp.zoom_in_at(150, 80);
        let after = vp.unproject(150, 80);
        assert!(vp.zoom > 1.0);
        assert!((before.0 - after.0).abs() < 2.0);
    }

    #[test]
    fn test_visible_bounds_world() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 200, 200);
        let b = vp.visible_bounds();
        assert_eq!(b.min.x, -180.0);
        assert_eq!(b.max.x, 180.0);
        assert!(b.min.y < -80.0 && b.max.y > 80.0);
    }
}
