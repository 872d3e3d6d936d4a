use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

/// Rows given to the bar chart block (borders included)
const BAR_BLOCK_ROWS: u16 = 14;

/// Columns given to the map legend
const LEGEND_COLS: u16 = 10;

/// Screen regions shared by drawing and mouse hit-testing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenLayout {
    pub map_block: Rect,
    pub slider: Rect,
    pub map: Rect,
    pub legend: Rect,
    pub bar_block: Rect,
    pub dropdown: Rect,
    pub bars: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(6),                 // Map block
                Constraint::Length(BAR_BLOCK_ROWS), // Bar block
                Constraint::Length(1),              // Status bar
            ])
            .split(area);

        let map_inner = inner(rows[0]);
        let map_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(map_inner);
        let map_cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(LEGEND_COLS)])
            .split(map_rows[1]);

        let bar_inner = inner(rows[1]);
        let bar_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(bar_inner);

        Self {
            map_block: rows[0],
            slider: map_rows[0],
            map: map_cols[0],
            legend: map_cols[1],
            bar_block: rows[1],
            dropdown: bar_rows[0],
            bars: bar_rows[1],
            status: rows[2],
        }
    }
}

/// Area inside a one-cell border
fn inner(r: Rect) -> Rect {
    // Too small for a border: an empty area at the origin, still inside `r`
    if r.width < 2 || r.height < 2 {
        return Rect::new(r.x, r.y, 0, 0);
    }
    Rect {
        x: r.x.saturating_add(1),
        y: r.y.saturating_add(1),
        width: r.width.saturating_sub(2),
        height: r.height.saturating_sub(2),
    }
}

/// Bar plot columns: group-name axis width and the longest bar in cells.
/// Roughly a quarter of the width stays free for the value labels.
pub fn bar_columns(bars: Rect) -> (u16, u16) {
    let axis = (bars.width / 4).min(24);
    let label_room = bars.width / 4;
    let max_len = bars.width.saturating_sub(axis + 1 + label_room);
    (axis, max_len)
}

/// `(col, row)` relative to `r`, when inside it
pub fn local(r: Rect, col: u16, row: u16) -> Option<(u16, u16)> {
    r.contains(Position::new(col, row))
        .then(|| (col - r.x, row - r.y))
}
