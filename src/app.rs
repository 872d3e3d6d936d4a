use crate::chart::{BarChartState, ChoroplethState};
use crate::incidents::{country_aggregate, group_aggregate, Dataset};
use crate::layout::{bar_columns, local, ScreenLayout};
use crate::map::{MapRenderer, Viewport, World};
use ratatui::layout::Rect;
use tracing::debug;

/// A year picked on one of the two controls. Each event re-renders one chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Slider above the map
    MapYear(i32),
    /// Dropdown above the bar chart
    BarYear(i32),
}

/// Year slider driving the map
#[derive(Clone, Debug)]
pub struct YearSlider {
    pub min: i32,
    pub max: i32,
    pub value: i32,
}

impl YearSlider {
    /// Range comes from the dataset; without one the slider is pinned to `initial`
    pub fn new(range: Option<(i32, i32)>, initial: i32) -> Self {
        let (min, max) = range.unwrap_or((initial, initial));
        Self {
            min,
            max,
            value: initial,
        }
    }

    /// Year after moving the knob by `delta`, clamped to the range
    pub fn step(&self, delta: i32) -> i32 {
        self.value.saturating_add(delta).clamp(self.min, self.max)
    }

    /// Year under column `offset` of a track `width` columns wide
    pub fn year_at(&self, offset: u16, width: u16) -> i32 {
        if width <= 1 {
            return self.min;
        }
        let t = offset.min(width - 1) as f64 / (width - 1) as f64;
        self.min + ((self.max - self.min) as f64 * t).round() as i32
    }

    /// Knob column on a track `width` columns wide
    pub fn knob(&self, width: u16) -> u16 {
        if width <= 1 || self.max == self.min {
            return 0;
        }
        let t = (self.value.clamp(self.min, self.max) - self.min) as f64 / (self.max - self.min) as f64;
        (t * (width - 1) as f64).round() as u16
    }
}

/// Year dropdown driving the bar chart
#[derive(Clone, Debug)]
pub struct YearDropdown {
    /// Distinct dataset years, ascending
    pub options: Vec<i32>,
    pub selected: i32,
}

impl YearDropdown {
    /// Option `delta` steps away from the current one, wrapping around.
    /// A selection that is not an option steps to its neighbours.
    pub fn step(&self, delta: i32) -> Option<i32> {
        let len = self.options.len() as i64;
        if len == 0 {
            return None;
        }
        let idx = match self.options.binary_search(&self.selected) {
            Ok(i) => i as i64 + delta as i64,
            Err(pos) if delta > 0 => pos as i64 + delta as i64 - 1,
            Err(pos) => pos as i64 + delta as i64,
        };
        Some(self.options[idx.rem_euclid(len) as usize])
    }

    /// Position of the selection among the options, 1-based
    pub fn position(&self) -> Option<usize> {
        self.options
            .binary_search(&self.selected)
            .ok()
            .map(|i| i + 1)
    }
}

/// Application state: loaded inputs, controls, and what each chart shows
pub struct App {
    pub layout: ScreenLayout,
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    /// `None` when the CSV failed to load
    pub dataset: Option<Dataset>,
    /// Empty when the GeoJSON failed to load
    pub world: World,
    pub world_loaded: bool,
    pub slider: YearSlider,
    pub dropdown: YearDropdown,
    pub choropleth: ChoroplethState,
    pub bars: BarChartState,
    pub should_quit: bool,
    /// Last mouse position while dragging the map
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for hover tooltips
    pub mouse_pos: Option<(u16, u16)>,
    dragging_slider: bool,
    /// UI frame counter; transitions are timed against it
    pub frame: u64,
}

impl App {
    pub fn new(area: Rect, dataset: Option<Dataset>, world: Option<World>, initial_year: i32) -> Self {
        let layout = ScreenLayout::new(area);
        let mut viewport = Viewport::world(0, 0);
        viewport.set_cells(layout.map.width, layout.map.height);

        let slider = YearSlider::new(dataset.as_ref().and_then(Dataset::year_range), initial_year);
        let dropdown = YearDropdown {
            options: dataset.as_ref().map(Dataset::years).unwrap_or_default(),
            selected: initial_year,
        };

        let world_loaded = world.is_some();
        let world = world.unwrap_or_default();
        let choropleth = ChoroplethState::new(world.len());

        let mut app = Self {
            layout,
            viewport,
            map_renderer: MapRenderer::new(),
            dataset,
            world,
            world_loaded,
            slider,
            dropdown,
            choropleth,
            bars: BarChartState::new(),
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            dragging_slider: false,
            frame: 0,
        };

        app.apply(Selection::MapYear(initial_year));
        app.apply(Selection::BarYear(initial_year));
        app
    }

    /// Single consumer of selection events
    pub fn apply(&mut self, selection: Selection) {
        match selection {
            Selection::MapYear(year) => self.render_map_year(year),
            Selection::BarYear(year) => self.render_bar_year(year),
        }
    }

    fn render_map_year(&mut self, year: i32) {
        self.slider.value = year;
        let Some(dataset) = &self.dataset else {
            return;
        };

        let filtered = dataset.filter_year(year);
        let counts = country_aggregate(&filtered);
        let diff = self.choropleth.apply(&self.world, counts, self.frame);
        debug!(
            year,
            records = filtered.len(),
            entered = diff.enter.len(),
            updated = diff.update.len(),
            exited = diff.exit.len(),
            "map recomputed"
        );
    }

    fn render_bar_year(&mut self, year: i32) {
        self.dropdown.selected = year;
        let Some(dataset) = &self.dataset else {
            return;
        };

        let filtered = dataset.filter_year(year);
        let groups = group_aggregate(&filtered);
        let diff = self.bars.apply(groups, self.frame);
        debug!(
            year,
            records = filtered.len(),
            entered = diff.enter.len(),
            updated = diff.update.len(),
            exited = diff.exit.len(),
            "bars recomputed"
        );
    }

    /// Move the map slider by `delta` years
    pub fn slider_step(&mut self, delta: i32) {
        let year = self.slider.step(delta);
        self.apply(Selection::MapYear(year));
    }

    /// Move the bar dropdown by `delta` options
    pub fn dropdown_step(&mut self, delta: i32) {
        if let Some(year) = self.dropdown.step(delta) {
            self.apply(Selection::BarYear(year));
        }
    }

    /// Advance the frame counter by `frames` elapsed UI frames
    pub fn advance(&mut self, frames: u64) {
        self.frame = self.frame.wrapping_add(frames);
    }

    pub fn is_animating(&self) -> bool {
        self.choropleth.is_animating(self.frame) || self.bars.is_animating(self.frame)
    }

    /// Bring the cached map layers up to date with the viewport before drawing
    pub fn refresh_map(&mut self) {
        let area = self.layout.map;
        if self.world_loaded && !area.is_empty() {
            self.map_renderer
                .layers(&self.world, area.width, area.height, &self.viewport);
        }
    }

    /// Recompute screen regions after a terminal resize
    pub fn resize(&mut self, area: Rect) {
        self.layout = ScreenLayout::new(area);
        self.viewport.set_cells(self.layout.map.width, self.layout.map.height);
    }

    pub fn reset_view(&mut self) {
        let (width, height) = (self.viewport.width, self.viewport.height);
        self.viewport = Viewport::world(width, height);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Terminal cell to Braille pixel inside the map, if over the map
    fn map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        local(self.layout.map, col, row).map(|(cx, cy)| (cx as i32 * 2, cy as i32 * 4))
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Left button pressed: grab the slider knob or start a map drag
    pub fn mouse_down(&mut self, col: u16, row: u16) {
        if local(self.layout.slider, col, row).is_some() {
            self.dragging_slider = true;
            self.slide_to(col);
        } else if local(self.layout.map, col, row).is_some() {
            self.last_mouse = Some((col, row));
        }
    }

    /// Mouse moved with the left button held
    pub fn mouse_drag(&mut self, col: u16, row: u16) {
        if self.dragging_slider {
            self.slide_to(col);
            return;
        }
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            // Less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
            self.last_mouse = Some((col, row));
        }
    }

    pub fn mouse_up(&mut self) {
        self.dragging_slider = false;
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Every slider input emits a selection, even for an unchanged year
    fn slide_to(&mut self, col: u16) {
        let track = slider_track(self.layout.slider);
        let offset = col.saturating_sub(track.x);
        let year = self.slider.year_at(offset, track.width);
        self.apply(Selection::MapYear(year));
    }

    /// Country under the mouse and its incident count
    pub fn map_hover(&self) -> Option<(&str, u32)> {
        let (col, row) = self.mouse_pos?;
        let (cx, cy) = local(self.layout.map, col, row)?;
        let (lon, lat) = self.viewport.cell_center(cx, cy);
        let idx = self.world.country_at(lon, lat)?;
        let name = self.world.countries()[idx].name.as_str();
        Some((name, self.choropleth.count(name)))
    }

    /// Bar under the mouse (over the drawn bar itself, not its label)
    pub fn bar_hover(&self) -> Option<usize> {
        let (col, row) = self.mouse_pos?;
        let (x, y) = local(self.layout.bars, col, row)?;
        let idx = self.bars.bar_at(y, self.layout.bars.height)?;

        let (axis, max_len) = bar_columns(self.layout.bars);
        let len = (self.bars.bars()[idx].length.value(self.frame) * max_len as f64).ceil() as u16;
        (x > axis && x <= axis + len.max(1)).then_some(idx)
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}

/// Slider line layout: `Year 2019 ` prefix, then the track, then the max year
pub const SLIDER_PREFIX: u16 = 17;
const SLIDER_SUFFIX: u16 = 6;

/// Columns of the slider line taken by the draggable track
pub fn slider_track(line: Rect) -> Rect {
    Rect {
        x: line.x + SLIDER_PREFIX.min(line.width),
        y: line.y,
        width: line.width.saturating_sub(SLIDER_PREFIX + SLIDER_SUFFIX),
        height: 1,
    }
}
