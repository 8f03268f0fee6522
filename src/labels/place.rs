use crate::config::LabelConfig;
use crate::geo::{distance_m, LatLng, LatLngBounds};
use crate::labels::candidate::LabelCandidate;
use crate::labels::spatial::SpatialGrid;
use tracing::warn;

/// ~1.1 km cells; marker spacing is at most tens of meters
const OBSTACLE_CELL_DEGREES: f64 = 0.01;

/// A foreground point marker labels must keep clear of
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub position: LatLng,
}

/// Read-only obstacle collection with a spatial index
pub struct ObstacleSet {
    grid: SpatialGrid,
}

impl ObstacleSet {
    /// Index obstacles, skipping any with unusable coordinates
    pub fn new(obstacles: impl IntoIterator<Item = Obstacle>) -> Self {
        let valid = obstacles.into_iter().filter_map(|o| {
            if o.position.is_valid() {
                Some(o.position)
            } else {
                warn!(lat = o.position.lat, lng = o.position.lng, "skipping invalid obstacle");
                None
            }
        });
        Self {
            grid: SpatialGrid::build(valid, OBSTACLE_CELL_DEGREES),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn is_near(&self, p: LatLng, min_distance_m: f64) -> bool {
        self.grid.any_within(p, min_distance_m)
    }

    pub fn positions(&self) -> &[LatLng] {
        self.grid.points()
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

/// Distance thresholds for one placement pass, in meters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementRules {
    pub min_label_distance: f64,
    pub min_marker_distance: f64,
}

impl PlacementRules {
    pub fn new(config: &LabelConfig, zoom_factor: f64, high_obstacle_density: bool) -> Self {
        Self {
            min_label_distance: config.min_label_distance(zoom_factor),
            min_marker_distance: config.min_marker_distance(zoom_factor, high_obstacle_density),
        }
    }
}

/// An accepted candidate
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLabel {
    pub candidate: LabelCandidate,
    pub in_viewport: bool,
}

/// Greedy single pass over the shortlist in order. A candidate is rejected if
/// it is too close to an already placed label or to any obstacle; rejected
/// candidates are never retried.
pub fn place_labels(
    shortlist: &[&LabelCandidate],
    obstacles: &ObstacleSet,
    viewport_bounds: &LatLngBounds,
    rules: &PlacementRules,
) -> Vec<PlacedLabel> {
    let mut placed: Vec<PlacedLabel> = Vec::with_capacity(shortlist.len());

    for &candidate in shortlist {
        let crowded = placed
            .iter()
            .any(|p| distance_m(candidate.center, p.candidate.center) < rules.min_label_distance);
        if crowded || obstacles.is_near(candidate.center, rules.min_marker_distance) {
            continue;
        }

        placed.push(PlacedLabel {
            candidate: candidate.clone(),
            in_viewport: viewport_bounds.contains(candidate.center),
        });
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::meters_to_lat_degrees;
    use crate::labels::select::tests::candidate;

    fn bounds() -> LatLngBounds {
        LatLngBounds::from_corners(LatLng::new(40.0, -5.0), LatLng::new(50.0, 5.0))
    }

    fn rules_at(zoom: f64, clustered: bool) -> PlacementRules {
        let cfg = LabelConfig::default();
        PlacementRules::new(&cfg, cfg.zoom_factor(zoom), clustered)
    }

    fn ids(placed: &[PlacedLabel]) -> Vec<&str> {
        placed.iter().map(|p| p.candidate.id.as_str()).collect()
    }

    #[test]
    fn test_all_far_apart_are_placed_in_order() {
        let pool = vec![
            candidate("a", 500_000, 41.0, 0.0),
            candidate("b", 300_000, 43.0, 0.0),
            candidate("c", 100_000, 45.0, 0.0),
            candidate("d", 50_000, 47.0, 0.0),
            candidate("e", 10_000, 49.0, 0.0),
        ];
        let shortlist: Vec<_> = pool.iter().collect();
        let placed = place_labels(&shortlist, &ObstacleSet::empty(), &bounds(), &rules_at(6.0, false));
        assert_eq!(ids(&placed), ["a", "b", "c", "d", "e"]);
        assert!(placed.iter().all(|p| p.in_viewport));
    }

    #[test]
    fn test_obstacle_on_center_rejects_candidate() {
        let pool = vec![
            candidate("huge", 9_000_000, 45.0, 0.0),
            candidate("small", 1_000, 46.0, 0.0),
        ];
        let shortlist: Vec<_> = pool.iter().collect();
        let obstacles = ObstacleSet::new([Obstacle {
            position: LatLng::new(45.0, 0.0),
        }]);
        let placed = place_labels(&shortlist, &obstacles, &bounds(), &rules_at(6.0, false));
        assert_eq!(ids(&placed), ["small"]);
    }

    #[test]
    fn test_too_close_keeps_higher_population() {
        // zoom 8 -> zoomFactor 3 -> 13.3m label spacing
        let offset = meters_to_lat_degrees(10.0);
        let pool = vec![
            candidate("big", 20_000, 45.0, 0.0),
            candidate("near", 10_000, 45.0 + offset, 0.0),
        ];
        let shortlist: Vec<_> = pool.iter().collect();
        let rules = rules_at(8.0, false);
        assert!(rules.min_label_distance > 10.0);

        let placed = place_labels(&shortlist, &ObstacleSet::empty(), &bounds(), &rules);
        assert_eq!(ids(&placed), ["big"]);
    }

    #[test]
    fn test_rejected_label_does_not_block_others() {
        // b is rejected by a; c is close to b but far enough from a
        let step = meters_to_lat_degrees(30.0);
        let pool = vec![
            candidate("a", 3, 45.0, 0.0),
            candidate("b", 2, 45.0 + step, 0.0),
            candidate("c", 1, 45.0 + 2.0 * step, 0.0),
        ];
        let shortlist: Vec<_> = pool.iter().collect();
        let placed = place_labels(&shortlist, &ObstacleSet::empty(), &bounds(), &rules_at(10.0, false));
        assert_eq!(ids(&placed), ["a", "c"]);
    }

    #[test]
    fn test_clustered_markers_need_more_room() {
        // 30m from a marker: clear of 25m, inside 40m (zoomFactor 1)
        let pool = vec![candidate("x", 1, 45.0 + meters_to_lat_degrees(30.0), 0.0)];
        let shortlist: Vec<_> = pool.iter().collect();
        let obstacles = ObstacleSet::new([Obstacle {
            position: LatLng::new(45.0, 0.0),
        }]);
        assert_eq!(
            place_labels(&shortlist, &obstacles, &bounds(), &rules_at(12.0, false)).len(),
            1
        );
        assert!(place_labels(&shortlist, &obstacles, &bounds(), &rules_at(12.0, true)).is_empty());
    }

    #[test]
    fn test_in_viewport_flag() {
        let pool = vec![candidate("out", 1, 51.0, 0.0), candidate("in", 1, 45.0, 0.0)];
        let shortlist: Vec<_> = pool.iter().collect();
        let placed = place_labels(&shortlist, &ObstacleSet::empty(), &bounds(), &rules_at(6.0, false));
        assert!(!placed[0].in_viewport);
        assert!(placed[1].in_viewport);
    }

    #[test]
    fn test_invalid_obstacles_are_skipped() {
        let obstacles = ObstacleSet::new([
            Obstacle { position: LatLng::new(f64::NAN, 0.0) },
            Obstacle { position: LatLng::new(45.0, 0.0) },
        ]);
        assert_eq!(obstacles.len(), 1);
    }

    #[test]
    fn test_placed_labels_respect_spacing() {
        let pool: Vec<_> = (0..60)
            .map(|i| {
                let lat = 45.0 + meters_to_lat_degrees(7.0 * (i % 10) as f64);
                let lng = 0.0001 * (i / 10) as f64;
                candidate(&format!("p{i}"), 1_000 - i as u64, lat, lng)
            })
            .collect();
        let obstacles = ObstacleSet::new((0..5).map(|i| Obstacle {
            position: LatLng::new(45.0 + meters_to_lat_degrees(15.0 * i as f64), 0.00025),
        }));
        let shortlist: Vec<_> = pool.iter().collect();

        for clustered in [false, true] {
            let rules = rules_at(9.0, clustered);
            let placed = place_labels(&shortlist, &obstacles, &bounds(), &rules);
            assert!(!placed.is_empty());
            for (i, a) in placed.iter().enumerate() {
                for b in &placed[i + 1..] {
                    assert!(distance_m(a.candidate.center, b.candidate.center) >= rules.min_label_distance);
                }
                for &o in obstacles.positions() {
                    assert!(distance_m(a.candidate.center, o) >= rules.min_marker_distance);
                }
            }
        }
    }
}
