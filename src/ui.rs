use crate::app::{slider_track, App, SLIDER_PREFIX};
use crate::chart::BarChartState;
use crate::colormap::{fade, Rgb, GREENS};
use crate::layout::bar_columns;
use crate::map::MapLayers;
use crate::scale::{legend_ticks, ColorDomain};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Left-partial block glyphs, index = eighths filled
const EIGHTHS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

#[inline(always)]
fn rgb(c: Rgb) -> Color {
    Color::Rgb(c[0], c[1], c[2])
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    render_map_block(frame, app);
    render_bar_block(frame, app);
    render_status_bar(frame, app, app.layout.status);
    render_tooltip(frame, app);
}

fn block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn render_map_block(frame: &mut Frame, app: &App) {
    let title = if !app.world_loaded {
        " World map unavailable ".to_string()
    } else if app.dataset.is_none() {
        " Incidents by Country (no data) ".to_string()
    } else {
        format!(" Incidents by Country, {} ", app.slider.value)
    };
    frame.render_widget(block(title), app.layout.map_block);

    render_slider(frame, app, app.layout.slider);

    // Layers come from `App::refresh_map`, run before each draw
    if let Some(layers) = app.map_renderer.cached().filter(|_| app.world_loaded) {
        let fills = (0..app.world.len())
            .map(|idx| app.choropleth.color(idx, app.frame))
            .collect();
        frame.render_widget(MapWidget { layers, fills }, app.layout.map);
    }

    if app.map_renderer.settings.show_legend && app.dataset.is_some() {
        frame.render_widget(
            LegendWidget {
                domain: app.choropleth.domain(),
            },
            app.layout.legend,
        );
    }
}

fn render_slider(frame: &mut Frame, app: &App, area: Rect) {
    let slider = &app.slider;
    let track = slider_track(area);
    let knob = slider.knob(track.width);

    let prefix = format!("Year {:<5} {:>5} ", slider.value, slider.min);
    let mut spans = vec![Span::styled(
        format!("{:<width$}", prefix, width = SLIDER_PREFIX as usize),
        Style::default().fg(Color::Yellow),
    )];
    if track.width > 0 {
        let before: String = "━".repeat(knob as usize);
        let after: String = "━".repeat((track.width - knob - 1) as usize);
        spans.push(Span::styled(before, Style::default().fg(Color::Green)));
        spans.push(Span::styled("●", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)));
        spans.push(Span::styled(after, Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled(format!(" {:<5}", slider.max), Style::default().fg(Color::Yellow)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Choropleth cells with Braille borders on top
struct MapWidget<'a> {
    layers: &'a MapLayers,
    /// Current fill per country feature
    fills: Vec<Rgb>,
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.is_empty() {
            return;
        }
        for cy in 0..self.layers.height.min(area.height) {
            for cx in 0..self.layers.width.min(area.width) {
                let cell = &mut buf[(area.x + cx, area.y + cy)];
                let fill = self
                    .layers
                    .country_at_cell(cx, cy)
                    .and_then(|idx| self.fills.get(idx).copied());

                if let Some(c) = fill {
                    cell.set_bg(rgb(c));
                }
                match self.layers.borders.glyph(cx as usize, cy as usize) {
                    Some(ch) => {
                        let stroke = if fill.is_some() { Color::Black } else { Color::Gray };
                        cell.set_char(ch).set_fg(stroke);
                    }
                    None => {
                        cell.set_char(' ');
                    }
                }
            }
        }
    }
}

/// Vertical Greens gradient with log-spaced tick labels
struct LegendWidget {
    domain: ColorDomain,
}

impl Widget for LegendWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.height < 3 || area.width < 4 {
            return;
        }
        buf.set_string(area.x + 1, area.y, "count", Style::default().fg(Color::DarkGray));

        let top = area.y + 1;
        let rows = area.height - 1;
        let span = (rows - 1).max(1) as f64;
        for r in 0..rows {
            let t = 1.0 - r as f64 / span;
            let style = Style::default().bg(rgb(GREENS.sample(t)));
            buf.set_string(area.x + 1, top + r, "  ", style);
        }

        for tick in legend_ticks(&self.domain) {
            let r = ((1.0 - tick.position) * span).round() as u16;
            let width = area.width.saturating_sub(4) as usize;
            let label: String = format!("-{}", tick.label).chars().take(width).collect();
            buf.set_string(area.x + 3, top + r.min(rows - 1), label, Style::default().fg(Color::White));
        }
    }
}

fn render_bar_block(frame: &mut Frame, app: &App) {
    let title = if app.dataset.is_none() {
        " Top Groups (no data) ".to_string()
    } else {
        format!(" Top 10 Groups, {} ", app.dropdown.selected)
    };
    frame.render_widget(block(title), app.layout.bar_block);

    let dd = &app.dropdown;
    let position = dd
        .position()
        .map(|p| format!("{}/{}", p, dd.options.len()))
        .unwrap_or_else(|| format!("-/{}", dd.options.len()));
    let line = Line::from(vec![
        Span::styled("Year ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("[{} ▾]", dd.selected),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}  n/p: change", position), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), app.layout.dropdown);

    if app.dataset.is_some() {
        frame.render_widget(
            BarsWidget {
                chart: &app.bars,
                frame: app.frame,
                hovered: app.bar_hover(),
            },
            app.layout.bars,
        );
    }
}

/// Horizontal bars, group axis on the left and value labels past each bar
struct BarsWidget<'a> {
    chart: &'a BarChartState,
    frame: u64,
    hovered: Option<usize>,
}

impl Widget for BarsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.is_empty() {
            return;
        }
        if self.chart.is_empty() {
            let msg = "No attributed incidents this year";
            let x = area.x + area.width.saturating_sub(msg.len() as u16) / 2;
            buf.set_string(x, area.y + area.height / 2, msg, Style::default().fg(Color::DarkGray));
            return;
        }

        let (axis, max_len) = bar_columns(area);
        for (idx, bar) in self.chart.bars().iter().enumerate() {
            let Some((top, thick)) = self.chart.bar_rows(idx, area.height) else {
                break;
            };

            let mut color = self.chart.color(bar);
            if self.hovered == Some(idx) {
                color = fade(color, 0.3);
            }

            // Length in eighths of a cell
            let eighths = (bar.length.value(self.frame) * max_len as f64 * 8.0).round() as usize;
            let full = eighths / 8;
            let partial = EIGHTHS[eighths % 8];
            let mut body: String = "█".repeat(full);
            if partial != ' ' {
                body.push(partial);
            }
            let body_len = body.chars().count() as u16;

            for r in 0..thick {
                buf.set_string(area.x + axis + 1, area.y + top + r, &body, Style::default().fg(rgb(color)));
            }

            let mid = area.y + top + thick / 2;
            let name: String = bar.group.chars().take(axis as usize).collect();
            let name_x = area.x + axis.saturating_sub(name.chars().count() as u16);
            buf.set_string(name_x, mid, &name, Style::default().fg(Color::Gray));

            let label_x = axis + 2 + body_len;
            if label_x < area.width {
                let room = (area.width - label_x) as usize;
                let label: String = bar.label().chars().take(room).collect();
                buf.set_string(area.x + label_x, mid, label, Style::default().fg(Color::White));
            }
        }
    }
}

/// Tooltip box next to the mouse: country count over the map, bar count over a bar
fn render_tooltip(frame: &mut Frame, app: &App) {
    let Some((col, row)) = app.mouse_pos else {
        return;
    };

    let text = if let Some((name, count)) = app.map_hover() {
        format!("{}: {} incidents", name, count)
    } else if let Some(idx) = app.bar_hover() {
        format!("Incidents: {}", app.bars.bars()[idx].count)
    } else {
        return;
    };

    let screen = frame.area();
    let width = (text.chars().count() as u16 + 2).min(screen.width);
    let height = 3.min(screen.height);
    // Prefer below-right of the cursor, flip when it would leave the screen
    let x = if col + 1 + width <= screen.right() {
        col + 1
    } else {
        col.saturating_sub(width)
    };
    let y = if row + 1 + height <= screen.bottom() {
        row + 1
    } else {
        row.saturating_sub(height)
    };
    let area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        ),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" ", Style::default()),
        Span::styled(
            if settings.show_borders { "[B]order " } else { "[b]order " },
            Style::default().fg(if settings.show_borders { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_legend { "[G]legend " } else { "[g]legend " },
            Style::default().fg(if settings.show_legend { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(" | {} incidents ", app.choropleth.total()),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            "| [/]:year {/}:decade n/p:bar year hjkl:pan +/-:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incidents::{Dataset, IncidentRecord};
    use crate::map::{box_country, World};
    use crate::transition::TRANSITION_FRAMES;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        let records = vec![
            IncidentRecord::new(2019, "Iraq", "ISIL"),
            IncidentRecord::new(2019, "Iraq", "ISIL"),
            IncidentRecord::new(2019, "Syria", "HTS"),
        ];
        let world = World::new(vec![box_country("Iraq", (39.0, 29.0), (48.0, 37.0))]);
        let mut app = App::new(
            Rect::new(0, 0, 100, 40),
            Some(Dataset::from_records(records)),
            Some(world),
            2019,
        );
        app.frame = TRANSITION_FRAMES;
        app
    }

    fn screen_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_draws_titles_and_labels() {
        let mut app = app();
        app.refresh_map();
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();

        let text = screen_text(terminal.backend().buffer());
        assert!(text.contains("Incidents by Country, 2019"));
        assert!(text.contains("Top 10 Groups, 2019"));
        assert!(text.contains("ISIL: 2"));
        assert!(text.contains("HTS: 1"));
        assert!(text.contains("[2019 ▾]"));
    }

    #[test]
    fn test_map_tooltip() {
        let mut app = app();
        app.viewport.center_lon = 43.5;
        app.viewport.center_lat = 33.0;
        app.viewport.zoom = 8.0;
        let map = app.layout.map;
        app.set_mouse_pos(map.x + map.width / 2, map.y + map.height / 2);
        app.refresh_map();

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let buf = terminal.backend().buffer();
        assert!(screen_text(buf).contains("Iraq: 2 incidents"));

        // Left of the cursor is still Iraq, painted with its fill
        let fill = rgb(app.choropleth.color(0, app.frame));
        assert_eq!(buf[(map.x + map.width / 2 - 2, map.y + map.height / 2)].bg, fill);
    }

    #[test]
    fn test_tiny_terminals_do_not_panic() {
        // Unattributed only (empty bar pane) and one drawn bar
        let datasets = [
            vec![IncidentRecord::new(2019, "Iraq", "Unknown")],
            vec![IncidentRecord::new(2019, "Iraq", "ISIL")],
        ];
        let sizes = [(1, 1), (2, 1), (10, 1), (10, 3), (20, 5), (40, 7), (5, 40)];
        for records in &datasets {
            for (w, h) in sizes {
                let world = World::new(vec![box_country("Iraq", (39.0, 29.0), (48.0, 37.0))]);
                let mut app = App::new(
                    Rect::new(0, 0, w, h),
                    Some(Dataset::from_records(records.clone())),
                    Some(world),
                    2019,
                );
                app.set_mouse_pos(w / 2, h / 2);
                app.refresh_map();
                let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
                terminal.draw(|f| render(f, &app)).unwrap();
            }
        }
    }

    #[test]
    fn test_no_data_panes() {
        let mut app = App::new(Rect::new(0, 0, 100, 40), None, None, 2019);
        app.refresh_map();
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let text = screen_text(terminal.backend().buffer());
        assert!(text.contains("World map unavailable"));
        assert!(text.contains("Top Groups (no data)"));
    }
}
