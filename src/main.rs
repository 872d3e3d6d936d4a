use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use incident_map::app::App;
use incident_map::args::Args;
use incident_map::data::load_world;
use incident_map::incidents::Dataset;
use incident_map::map::World;
use incident_map::transition::FrameClock;
use incident_map::{report, ui};
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(&args)?;

    if args.report {
        let dataset = Dataset::load(&args.data)
            .with_context(|| format!("Failed to load incident data from {}", args.data.display()))?;
        return report::run_report(&dataset, args.year, args.json, &mut std::io::stdout().lock());
    }

    let (dataset, world) = load_inputs(&args);

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, dataset, world, args.year);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// The terminal belongs to the UI, so the TUI logs to a file; `--report` logs to stderr.
fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if args.report {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)
        .with_context(|| format!("Failed to open log file {}", args.log_file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Load the CSV and the GeoJSON in parallel. A failed input is logged and left out.
fn load_inputs(args: &Args) -> (Option<Dataset>, Option<World>) {
    let (dataset, world) = rayon::join(|| Dataset::load(&args.data), || load_world(&args.world));

    let dataset = dataset
        .inspect_err(|e| error!(error = %e, "incident data failed to load, charts stay blank"))
        .ok();
    let world = world
        .inspect_err(|e| error!(error = %e, "world map failed to load, map pane stays empty"))
        .ok();
    (dataset, world)
}

/// Handle mouse events for the slider, panning, zooming and hover
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for tooltips
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click sets the slider or starts a map drag
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(),
        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    dataset: Option<Dataset>,
    world: Option<World>,
    year: i32,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(Rect::new(0, 0, size.width, size.height), dataset, world, year);
    let mut clock = FrameClock::new(Instant::now());
    info!(year, "ui started");

    // Main loop
    loop {
        // Draw; the map is only rasterised again when the view changed
        app.refresh_map();
        terminal.draw(|frame| ui::render(frame, &app))?;

        // ~60fps while a transition runs, slower when idle
        let timeout = if app.is_animating() { 16 } else { 50 };
        if event::poll(Duration::from_millis(timeout))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Map year slider
                            KeyCode::Char('[') => app.slider_step(-1),
                            KeyCode::Char(']') => app.slider_step(1),
                            KeyCode::Char('{') => app.slider_step(-10),
                            KeyCode::Char('}') => app.slider_step(10),

                            // Bar chart year dropdown
                            KeyCode::Char('n') | KeyCode::Char('N') => app.dropdown_step(1),
                            KeyCode::Char('p') | KeyCode::Char('P') => app.dropdown_step(-1),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            // Layer toggles
                            KeyCode::Char('b') | KeyCode::Char('B') => {
                                app.map_renderer.toggle_borders();
                            }
                            KeyCode::Char('g') | KeyCode::Char('G') => {
                                app.map_renderer.toggle_legend();
                            }

                            // Reset view
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(Rect::new(0, 0, width, height));
                }
                _ => {}
            }
        }

        // Transitions follow the wall clock, not the number of events handled
        app.advance(clock.advance(Instant::now()));

        if app.should_quit {
            break;
        }
    }

    info!("ui closed");
    Ok(())
}
