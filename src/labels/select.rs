use crate::config::LabelConfig;
use crate::geo::LatLngBounds;
use crate::labels::candidate::LabelCandidate;
use crate::labels::viewport::Viewport;

/// Ordered, size-bounded set of candidates to attempt placement for
#[derive(Debug)]
pub struct Selection<'a> {
    /// Label budget for this view
    pub budget: usize,
    pub zoom_factor: f64,
    /// Bounds the candidates were gathered from (after any sparse fallback)
    pub search_bounds: LatLngBounds,
    /// Population cutoff applied when the view was too dense
    pub threshold: Option<u64>,
    /// Leading entries of `shortlist` that lie inside the raw viewport
    pub priority_len: usize,
    pub shortlist: Vec<&'a LabelCandidate>,
}

fn within<'a>(pool: &'a [LabelCandidate], bounds: &LatLngBounds) -> Vec<&'a LabelCandidate> {
    pool.iter().filter(|c| bounds.contains(c.center)).collect()
}

/// Filter and rank the pool for the current viewport.
///
/// In-view candidates come first, then the off-screen buffer; each part holds
/// at most `budget` entries in descending population order. Sorting is stable
/// so equal populations keep pool order.
pub fn select_candidates<'a>(
    pool: &'a [LabelCandidate],
    viewport: &Viewport,
    config: &LabelConfig,
) -> Selection<'a> {
    let budget = config.labels_per_view(viewport.zoom);
    let zoom_factor = config.zoom_factor(viewport.zoom);
    let margin = config.margin(zoom_factor);

    let mut search_bounds = viewport.bounds.pad(margin);
    let mut visible = within(pool, &search_bounds);

    // Sparse region: widen the net so something still gets labelled
    if visible.len() * 2 < budget {
        search_bounds = viewport.bounds.pad(margin * config.sparse_margin_multiplier);
        visible = within(pool, &search_bounds);
    }

    visible.sort_by(|a, b| b.population.cmp(&a.population));

    let mut threshold = None;
    let cap = budget * config.threshold_multiplier;
    if visible.len() > cap {
        let cutoff = visible[cap.min(visible.len() - 1)].population;
        visible.retain(|c| c.population >= cutoff);
        threshold = Some(cutoff);
    }

    let (priority, extra): (Vec<_>, Vec<_>) = visible
        .into_iter()
        .partition(|c| viewport.bounds.contains(c.center));

    let priority_len = priority.len().min(budget);
    let shortlist = priority
        .into_iter()
        .take(budget)
        .chain(extra.into_iter().take(budget))
        .collect();

    Selection {
        budget,
        zoom_factor,
        search_bounds,
        threshold,
        priority_len,
        shortlist,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geo::LatLng;

    pub(crate) fn candidate(id: &str, population: u64, lat: f64, lng: f64) -> LabelCandidate {
        LabelCandidate {
            id: id.to_string(),
            population,
            center: LatLng::new(lat, lng),
        }
    }

    fn view(zoom: f64) -> Viewport {
        Viewport {
            bounds: LatLngBounds::from_corners(LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0)),
            zoom,
        }
    }

    fn ids<'a>(sel: &'a Selection) -> Vec<&'a str> {
        sel.shortlist.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_empty_pool() {
        let sel = select_candidates(&[], &view(6.0), &LabelConfig::default());
        assert!(sel.shortlist.is_empty());
        assert_eq!(sel.budget, 18);
        assert_eq!(sel.threshold, None);
    }

    #[test]
    fn test_sorted_by_population() {
        let pool = vec![
            candidate("c", 100_000, 3.0, 3.0),
            candidate("a", 500_000, 1.0, 1.0),
            candidate("e", 10_000, 5.0, 5.0),
            candidate("b", 300_000, 2.0, 2.0),
            candidate("d", 50_000, 4.0, 4.0),
        ];
        let sel = select_candidates(&pool, &view(6.0), &LabelConfig::default());
        assert_eq!(ids(&sel), ["a", "b", "c", "d", "e"]);
        assert_eq!(sel.priority_len, 5);
    }

    #[test]
    fn test_priority_before_buffer() {
        // zoom 6 -> margin 0.1 -> 1 degree of padding on a 10 degree view
        let pool = vec![
            candidate("outside-big", 9_000_000, 10.5, 5.0),
            candidate("inside-small", 1_000, 5.0, 5.0),
            candidate("inside-mid", 5_000, 6.0, 6.0),
        ];
        let sel = select_candidates(&pool, &view(6.0), &LabelConfig::default());
        assert_eq!(ids(&sel), ["inside-mid", "inside-small", "outside-big"]);
        assert_eq!(sel.priority_len, 2);
    }

    #[test]
    fn test_far_candidates_excluded() {
        let pool: Vec<_> = (0..10)
            .map(|i| candidate(&format!("in{i}"), 100 + i, 5.0, i as f64))
            .chain([candidate("far", 1_000_000, 40.0, 40.0)])
            .collect();
        let sel = select_candidates(&pool, &view(6.0), &LabelConfig::default());
        assert!(sel.shortlist.iter().all(|c| c.id != "far"));
    }

    #[test]
    fn test_sparse_fallback_widens_search() {
        // Only one candidate, sitting in the second padding ring (1..2 degrees out)
        let pool = vec![candidate("edge", 42, 11.5, 5.0)];
        let sel = select_candidates(&pool, &view(6.0), &LabelConfig::default());
        assert_eq!(ids(&sel), ["edge"]);
        assert_eq!(sel.priority_len, 0);
        assert!((sel.search_bounds.north_east.lat - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_fallback_when_dense_enough() {
        let mut pool: Vec<_> = (0..9)
            .map(|i| candidate(&format!("in{i}"), 100, 5.0, i as f64))
            .collect();
        pool.push(candidate("edge", 1_000_000, 11.5, 5.0));
        let sel = select_candidates(&pool, &view(6.0), &LabelConfig::default());
        assert!(sel.shortlist.iter().all(|c| c.id != "edge"));
    }

    #[test]
    fn test_threshold_cuts_low_population() {
        // zoom 3.4 -> budget 10, cap 20
        let pool: Vec<_> = (0..40)
            .map(|i| candidate(&format!("p{i}"), 1_000 * (i as u64 + 1), (i / 8) as f64 * 2.0 + 1.0, (i % 8) as f64 + 1.0))
            .collect();
        let sel = select_candidates(&pool, &view(3.4), &LabelConfig::default());
        assert_eq!(sel.budget, 10);

        // Rank 20 (0-indexed) of 40000, 39000, ... is 20000
        assert_eq!(sel.threshold, Some(20_000));
        assert!(sel.shortlist.iter().all(|c| c.population >= 20_000));
        assert_eq!(sel.shortlist.len(), 10);
    }

    #[test]
    fn test_threshold_keeps_ties_at_cutoff() {
        let pool: Vec<_> = (0..30)
            .map(|i| candidate(&format!("p{i}"), if i < 5 { 900 } else { 500 }, 5.0, i as f64 / 3.0))
            .collect();
        // budget 5, cap 10: cutoff lands inside the 500 block, all ties survive
        let sel = select_candidates(&pool, &view(1.0), &LabelConfig::default());
        assert_eq!(sel.threshold, Some(500));
        assert_eq!(sel.shortlist.len(), 5);
        assert!(sel.shortlist.iter().all(|c| c.population == 900));
    }

    #[test]
    fn test_partition_caps() {
        // Scenario: 40 candidates spread over the padded view, budget 10
        let cfg = LabelConfig::default();
        let vp = view(3.4);
        let padded = vp.bounds.pad(cfg.margin(cfg.zoom_factor(vp.zoom)));
        let (lat_span, lng_span) = padded.span();
        let pool: Vec<_> = (0..40)
            .map(|i| {
                let lat = padded.south_west.lat + lat_span * ((i / 8) as f64 + 0.5) / 5.0;
                let lng = padded.south_west.lng + lng_span * ((i % 8) as f64 + 0.5) / 8.0;
                candidate(&format!("p{i}"), 10_000 + 37 * ((i * 7919) % 40) as u64, lat, lng)
            })
            .collect();

        let sel = select_candidates(&pool, &vp, &cfg);
        assert!(sel.shortlist.len() <= 20);
        assert!(sel.priority_len <= 10);
        assert!(sel.shortlist.len() - sel.priority_len <= 10);

        let (inside, outside) = sel.shortlist.split_at(sel.priority_len);
        assert!(inside.iter().all(|c| vp.bounds.contains(c.center)));
        assert!(outside.iter().all(|c| !vp.bounds.contains(c.center)));
        for part in [inside, outside] {
            assert!(part.windows(2).all(|w| w[0].population >= w[1].population));
        }
        let cutoff = sel.threshold.unwrap();
        assert!(sel.shortlist.iter().all(|c| c.population >= cutoff));
    }

    #[test]
    fn test_equal_population_keeps_pool_order() {
        let pool = vec![
            candidate("first", 10, 1.0, 1.0),
            candidate("second", 10, 2.0, 2.0),
            candidate("third", 10, 3.0, 3.0),
        ];
        let sel = select_candidates(&pool, &view(6.0), &LabelConfig::default());
        assert_eq!(ids(&sel), ["first", "second", "third"]);
    }
}
