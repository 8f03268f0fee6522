use crate::map::{MapRenderer, MapView};
use anyhow::Result;
use label_map::config::LabelConfig;
use label_map::data::{self, PlaceDataset};
use label_map::labels::{LabelLayer, ObstacleSet, ViewportTracker};
use std::path::PathBuf;
use tracing::info;

/// Where the datasets come from; `None` uses the built-in samples
#[derive(Clone, Default)]
pub struct DataSources {
    pub places: Option<PathBuf>,
    pub branches: Option<PathBuf>,
}

/// Application state
pub struct App {
    pub view: MapView,
    pub tracker: ViewportTracker,
    pub labels: LabelLayer,
    pub map_renderer: MapRenderer,
    pub sources: DataSources,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    dragged: bool,
}

/// Terminal cells to braille pixels, minus the border and status bar
fn canvas_size(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(3);
    (inner_width * 2, inner_height * 4)
}

/// Terminal cell to braille pixel, accounting for the 1-cell border
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    ((col.saturating_sub(1) as i32) * 2, (row.saturating_sub(1) as i32) * 4)
}

impl App {
    pub fn new(
        width: usize,
        height: usize,
        center: (f64, f64),
        zoom: f64,
        config: LabelConfig,
        sources: DataSources,
    ) -> Self {
        let (pw, ph) = canvas_size(width, height);
        let (lat, lon) = center;
        let mut view = MapView::new(lon, lat, zoom, pw, ph);
        let tracker = ViewportTracker::attach(&mut view);

        Self {
            view,
            tracker,
            labels: LabelLayer::new(config),
            map_renderer: MapRenderer::new(),
            sources,
            should_quit: false,
            last_mouse: None,
            dragged: false,
        }
    }

    /// (Re)load places and branches. The candidate pool is only rebuilt when
    /// the place data actually changed.
    pub fn load_data(&mut self) -> Result<()> {
        let places: PlaceDataset = match &self.sources.places {
            Some(path) => data::load_places(path)?,
            None => data::sample_places(),
        };
        if !self.labels.load_dataset(places.id, &places.features) {
            info!("place dataset unchanged, keeping candidate pool");
        }

        let obstacles = match &self.sources.branches {
            Some(path) => data::load_obstacles(path)?,
            None => data::sample_obstacles(),
        };
        self.labels.set_obstacles(ObstacleSet::new(obstacles));
        Ok(())
    }

    /// Pick up finished gestures and refresh labels if needed
    pub fn update(&mut self) {
        let changed = self.tracker.poll().is_some();
        if changed || self.labels.needs_recompute() {
            self.labels.recompute(self.tracker.viewport());
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pw, ph) = canvas_size(width, height);
        self.view.resize(pw, ph);
    }

    /// Keyboard pan: a complete gesture
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.view.pan(dx, dy);
        self.view.end_move();
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.view.zoom_at(px, py, 1.0);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.view.zoom_at(px, py, -1.0);
    }

    pub fn start_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Follow the mouse; labels wait for the release
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            let dx = (last_col as i32 - col as i32) * 2;
            let dy = (last_row as i32 - row as i32) * 4;
            if dx != 0 || dy != 0 {
                self.view.pan(dx, dy);
                self.dragged = true;
            }
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        if self.dragged {
            self.view.end_move();
        }
        self.last_mouse = None;
        self.dragged = false;
    }

    /// Marker clustering upstream means denser markers, so labels keep more room
    pub fn toggle_clustering(&mut self) {
        let high = !self.labels.high_obstacle_density();
        self.labels.set_high_obstacle_density(high);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        format!("z{:.0}", self.view.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.2}°{}, {:.2}°{}",
            self.view.center_lat.abs(),
            if self.view.center_lat >= 0.0 { "N" } else { "S" },
            self.view.center_lon.abs(),
            if self.view.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// "placed/shortlist (budget) zf gen" summary for the status bar
    pub fn label_stats(&self) -> String {
        match self.labels.current() {
            Some(f) => format!(
                "{} placed of {} (budget {}, zf {:.0}, gen {})",
                f.labels.len(),
                f.shortlist_len,
                f.budget,
                f.zoom_factor,
                f.generation
            ),
            None => "no labels".to_string(),
        }
    }
}
