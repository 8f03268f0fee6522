/// Mean Earth radius in meters, matching the spherical model web maps use
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic position in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[inline(always)]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the usual lat/lng ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Axis-aligned lat/lng rectangle. Edges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Build bounds from any two opposite corners
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    #[inline(always)]
    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }

    /// (lat span, lng span) in degrees
    pub fn span(&self) -> (f64, f64) {
        (
            self.north_east.lat - self.south_west.lat,
            self.north_east.lng - self.south_west.lng,
        )
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) * 0.5,
            (self.south_west.lng + self.north_east.lng) * 0.5,
        )
    }

    /// Grow every side by `ratio` times the span on that axis
    pub fn pad(&self, ratio: f64) -> Self {
        let (lat_span, lng_span) = self.span();
        let dlat = lat_span.abs() * ratio;
        let dlng = lng_span.abs() * ratio;
        Self {
            south_west: LatLng::new(self.south_west.lat - dlat, self.south_west.lng - dlng),
            north_east: LatLng::new(self.north_east.lat + dlat, self.north_east.lng + dlng),
        }
    }
}

/// Great-circle (haversine) distance in meters
#[inline(always)]
pub fn distance_m(a: LatLng, b: LatLng) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Latitude offset in degrees covering `meters` of northward travel
#[inline(always)]
pub fn meters_to_lat_degrees(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_M).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let b = LatLngBounds::from_corners(LatLng::new(10.0, 20.0), LatLng::new(0.0, 0.0));
        assert!(b.contains(LatLng::new(0.0, 0.0)));
        assert!(b.contains(LatLng::new(10.0, 20.0)));
        assert!(b.contains(LatLng::new(5.0, 10.0)));
        assert!(!b.contains(LatLng::new(10.0001, 10.0)));
        assert!(!b.contains(LatLng::new(5.0, -0.0001)));
    }

    #[test]
    fn test_pad_uses_span_ratio() {
        let b = LatLngBounds::from_corners(LatLng::new(0.0, 0.0), LatLng::new(10.0, 20.0));
        let p = b.pad(0.1);
        assert!((p.south_west.lat + 1.0).abs() < 1e-12);
        assert!((p.north_east.lat - 11.0).abs() < 1e-12);
        assert!((p.south_west.lng + 2.0).abs() < 1e-12);
        assert!((p.north_east.lng - 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let d = distance_m(LatLng::new(0.0, 0.0), LatLng::new(1.0, 0.0));
        // 2πR / 360
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
        assert_eq!(distance_m(LatLng::new(45.0, 7.0), LatLng::new(45.0, 7.0)), 0.0);
    }

    #[test]
    fn test_lat_degrees_roundtrip() {
        let deg = meters_to_lat_degrees(1_000.0);
        let d = distance_m(LatLng::new(10.0, 10.0), LatLng::new(10.0 + deg, 10.0));
        assert!((d - 1_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_validity() {
        assert!(LatLng::new(-90.0, 180.0).is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }
}
