use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_circle, draw_marker};
use crate::map::projection::MapView;
use label_map::labels::{LabelCandidate, LabelFrame, ObstacleSet};

/// A label ready to print at a character cell
pub struct ScreenLabel {
    pub col: u16,
    pub row: u16,
    pub text: String,
    pub z_index: i32,
}

/// Rendered layers, back to front
pub struct MapLayers {
    pub places: BrailleCanvas,
    pub markers: BrailleCanvas,
    /// Sorted by ascending z-index, so later entries draw on top
    pub labels: Vec<ScreenLabel>,
}

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_places: bool,
    pub show_markers: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_places: true,
            show_markers: true,
            show_labels: true,
        }
    }
}

/// Draws place dots, branch markers and the committed label frame
#[derive(Default)]
pub struct MapRenderer {
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render onto a `cols` x `rows` character area
    pub fn render(
        &self,
        cols: usize,
        rows: usize,
        view: &MapView,
        places: &[LabelCandidate],
        obstacles: &ObstacleSet,
        frame: Option<&LabelFrame>,
    ) -> MapLayers {
        let mut layers = MapLayers {
            places: BrailleCanvas::new(cols, rows),
            markers: BrailleCanvas::new(cols, rows),
            labels: Vec::new(),
        };

        if self.settings.show_places {
            let radius = if view.zoom >= 10.0 { 1 } else { 0 };
            for c in places {
                let (px, py) = view.project(c.center.lng, c.center.lat);
                if view.is_visible(px, py) {
                    draw_circle(&mut layers.places, px, py, radius);
                }
            }
        }

        if self.settings.show_markers {
            for p in obstacles.positions() {
                let (px, py) = view.project(p.lng, p.lat);
                if view.is_visible(px, py) {
                    draw_marker(&mut layers.markers, px, py, 1);
                }
            }
        }

        if let Some(frame) = frame.filter(|_| self.settings.show_labels) {
            for ins in frame.labels.iter().filter(|l| l.in_viewport) {
                let (px, py) = view.project(ins.anchor.lng, ins.anchor.lat);
                if !view.is_visible(px, py) {
                    continue;
                }
                // Braille pixels to character cells; text starts right of the dot
                let col = (px / 2) as u16;
                let row = (py / 4) as u16;
                if let Some(col) = col.checked_add(1) {
                    layers.labels.push(ScreenLabel {
                        col,
                        row,
                        text: ins.text.clone(),
                        z_index: ins.z_index,
                    });
                }
            }
            layers.labels.sort_by_key(|l| l.z_index);
        }

        layers
    }

    pub fn toggle_places(&mut self) {
        self.settings.show_places = !self.settings.show_places;
    }

    pub fn toggle_markers(&mut self) {
        self.settings.show_markers = !self.settings.show_markers;
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }
}
