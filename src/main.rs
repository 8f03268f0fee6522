mod app;
mod braille;
mod map;
mod ui;

use anyhow::{Context, Result};
use app::{App, DataSources};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use label_map::config::{load_config, LabelConfig};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "label-map", version, about = "Population-ranked place labels that avoid each other and branch markers")]
struct Args {
    /// GeoJSON FeatureCollection of places (built-in sample if omitted)
    #[arg(short = 'p', long)]
    places: Option<PathBuf>,

    /// JSON array of branch locations (built-in sample if omitted)
    #[arg(short = 'b', long)]
    branches: Option<PathBuf>,

    /// Label tuning JSON file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Where logs go; the terminal belongs to the map
    #[arg(long, default_value = "label-map.log")]
    log_file: PathBuf,

    /// Start with marker clustering off (tighter label-to-marker spacing)
    #[arg(long)]
    no_clustering: bool,

    /// Initial zoom level
    #[arg(short = 'z', long, default_value_t = 7.0)]
    zoom: f64,

    /// Initial center as LAT,LNG
    #[arg(long, value_parser = parse_center, default_value = "39.5,-8.0")]
    center: (f64, f64),
}

fn parse_center(s: &str) -> Result<(f64, f64), String> {
    let (lat, lng) = s.split_once(',').ok_or("expected LAT,LNG")?;
    let lat = lat.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let lng = lng.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((lat, lng))
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;
    let config: LabelConfig = load_config(args.config.as_deref())?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, &args, config);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    if let Err(e) = &result {
        tracing::error!(error = %e, "label-map exited with an error");
    }
    result
}

/// Handle mouse events for panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Scroll wheel zooms towards the mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll pans (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click and drag to pan; labels follow on release
        MouseEventKind::Down(MouseButton::Left) => app.start_drag(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, args: &Args, config: LabelConfig) -> Result<()> {
    let size = terminal.size()?;
    let sources = DataSources {
        places: args.places.clone(),
        branches: args.branches.clone(),
    };
    let mut app = App::new(
        size.width as usize,
        size.height as usize,
        args.center,
        args.zoom,
        config,
        sources,
    );
    app.labels.set_high_obstacle_density(!args.no_clustering);
    app.load_data()?;

    // Main loop
    loop {
        app.update();

        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -8),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 8),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            // Layer toggles
                            KeyCode::Char('c') | KeyCode::Char('C') => app.toggle_clustering(),
                            KeyCode::Char('L') => app.map_renderer.toggle_labels(),
                            KeyCode::Char('p') | KeyCode::Char('P') => {
                                app.map_renderer.toggle_places();
                            }
                            KeyCode::Char('m') | KeyCode::Char('M') => {
                                app.map_renderer.toggle_markers();
                            }

                            // Reload datasets; unchanged places keep their cached pool
                            KeyCode::Char('r') => {
                                if let Err(e) = app.load_data() {
                                    tracing::warn!(error = %e, "reload failed, keeping previous data");
                                }
                            }

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
