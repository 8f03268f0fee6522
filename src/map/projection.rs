use label_map::geo::{LatLng, LatLngBounds};
use label_map::labels::{
    MapHost, Subscription, SubscriptionId, ViewChange, ViewEventHub, ViewEventKind, Viewport,
};
use std::f64::consts::PI;

/// World width in braille pixels at zoom level 0
const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 18.0;
const MAX_LAT: f64 = 85.051_128_78;

/// Web Mercator forward projection to normalized [0, 1] world coords
#[inline(always)]
fn to_world(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LAT, MAX_LAT);
    let x = (lon + 180.0) / 360.0;
    let lat_rad = lat * PI / 180.0;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x, y)
}

#[inline(always)]
fn from_world(x: f64, y: f64) -> (f64, f64) {
    let lon = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI;
    (lon, lat)
}

/// Pannable, zoomable map camera. Zoom uses slippy-map levels, so each level
/// doubles the scale. Emits view-end events to subscribers.
pub struct MapView {
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
    /// Canvas width in braille pixels
    pub width: usize,
    /// Canvas height in braille pixels
    pub height: usize,
    events: ViewEventHub,
}

impl MapView {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat: center_lat.clamp(-MAX_LAT, MAX_LAT),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
            events: ViewEventHub::new(),
        }
    }

    #[inline(always)]
    fn scale(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    fn emit(&mut self, kind: ViewEventKind) {
        let viewport = self.viewport();
        self.events.emit(ViewChange { kind, viewport });
    }

    /// Move by a pixel delta without announcing it (mid-drag)
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.scale();
        let (cx, cy) = to_world(self.center_lon, self.center_lat);
        let (lon, lat) = from_world(cx + dx as f64 / scale, cy + dy as f64 / scale);

        // Wrap longitude
        self.center_lon = (lon + 180.0).rem_euclid(360.0) - 180.0;
        self.center_lat = lat.clamp(-MAX_LAT, MAX_LAT);
    }

    /// Announce that a pan gesture finished
    pub fn end_move(&mut self) {
        self.emit(ViewEventKind::MoveEnd);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + 1.0);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - 1.0);
    }

    fn set_zoom(&mut self, zoom: f64) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom != self.zoom {
            self.zoom = zoom;
            self.emit(ViewEventKind::ZoomEnd);
        }
    }

    /// Zoom one level keeping the point under (px, py) fixed
    pub fn zoom_at(&mut self, px: i32, py: i32, delta: f64) {
        let (lon, lat) = self.unproject(px, py);
        let zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom == self.zoom {
            return;
        }
        self.zoom = zoom;

        // Pan so the geographic point is back under the cursor
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
        self.emit(ViewEventKind::ZoomEnd);
    }

    /// Canvas size changed; the visible bounds did too
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.emit(ViewEventKind::MoveEnd);
        }
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.scale();
        let (cx, cy) = to_world(self.center_lon, self.center_lat);
        let x = (px as f64 - self.width as f64 / 2.0) / scale + cx;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + cy;
        from_world(x, y)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let scale = self.scale();
        let (x, y) = to_world(lon, lat);
        let (cx, cy) = to_world(self.center_lon, self.center_lat);

        let px = ((x - cx) * scale + self.width as f64 / 2.0).floor() as i32;
        let py = ((y - cy) * scale + self.height as f64 / 2.0).floor() as i32;
        (px, py)
    }

    /// Check if a projected point falls on the canvas
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= 0 && px < self.width as i32 && py >= 0 && py < self.height as i32
    }
}

impl MapHost for MapView {
    fn bounds(&self) -> LatLngBounds {
        let (west, south) = self.unproject(0, self.height as i32);
        let (east, north) = self.unproject(self.width as i32, 0);
        LatLngBounds::from_corners(LatLng::new(south, west), LatLng::new(north, east))
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn subscribe(&mut self) -> Subscription {
        self.events.subscribe()
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.events.unsubscribe(id);
    }
}
