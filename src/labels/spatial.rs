use crate::geo::{distance_m, meters_to_lat_degrees, LatLng};
use std::collections::HashMap;

/// Spatial hash grid over lat/lng points for radius queries.
/// Cells are square in degrees; exact distances are checked after the
/// coarse cell lookup.
pub struct SpatialGrid {
    /// Point indices per (lng cell, lat cell)
    cells: HashMap<(i32, i32), Vec<usize>>,
    points: Vec<LatLng>,
    /// Cell size in degrees
    cell_size: f64,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            points: Vec::new(),
            cell_size,
        }
    }

    pub fn build(points: impl IntoIterator<Item = LatLng>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for p in points {
            grid.insert(p);
        }
        grid
    }

    #[inline(always)]
    fn to_cell(&self, p: LatLng) -> (i32, i32) {
        let x = (p.lng / self.cell_size).floor() as i32;
        let y = (p.lat / self.cell_size).floor() as i32;
        (x, y)
    }

    pub fn insert(&mut self, p: LatLng) {
        let idx = self.points.len();
        self.points.push(p);
        let cell = self.to_cell(p);
        self.cells.entry(cell).or_default().push(idx);
    }

    /// True if any indexed point lies strictly closer than `radius_m` meters
    pub fn any_within(&self, center: LatLng, radius_m: f64) -> bool {
        if self.points.is_empty() || radius_m <= 0.0 {
            return false;
        }

        // Degrees of latitude always bound the great-circle distance; longitude
        // degrees stretch with 1/cos(lat), taken at the most poleward edge.
        let dlat = meters_to_lat_degrees(radius_m);
        let edge_lat = (center.lat.abs() + dlat).min(90.0);
        let dlng = (dlat / edge_lat.to_radians().cos().max(1e-6)).min(360.0);

        let (cx, cy) = self.to_cell(center);
        let rx = (dlng / self.cell_size).ceil() as i32 + 1;
        let ry = (dlat / self.cell_size).ceil() as i32 + 1;

        // Tiny radii on huge grids: a full scan is cheaper than walking cells
        if (2 * rx as i64 + 1) * (2 * ry as i64 + 1) > self.points.len() as i64 {
            return self.points.iter().any(|&p| distance_m(center, p) < radius_m);
        }

        for dy in -ry..=ry {
            for dx in -rx..=rx {
                if let Some(indices) = self.cells.get(&(cx + dx, cy + dy)) {
                    if indices
                        .iter()
                        .any(|&i| distance_m(center, self.points[i]) < radius_m)
                    {
                        return true;
                    }
                }
            }
        }
        false
    }

    #[inline(always)]
    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
