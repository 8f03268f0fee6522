use crate::config::LabelConfig;
use crate::labels::candidate::{CandidateCache, DatasetId, LabelCandidate};
use crate::labels::instruction::PlacementInstruction;
use crate::labels::place::{place_labels, ObstacleSet, PlacedLabel, PlacementRules};
use crate::labels::select::select_candidates;
use crate::labels::viewport::Viewport;
use geojson::Feature;
use std::sync::Arc;
use tracing::{debug, warn};

/// One complete label layer, ready to replace the previous one
#[derive(Clone, Debug)]
pub struct LabelFrame {
    pub generation: u64,
    pub viewport: Viewport,
    pub budget: usize,
    pub zoom_factor: f64,
    pub shortlist_len: usize,
    /// Accepted by placement (includes any whose instruction failed)
    pub placed_len: usize,
    pub labels: Vec<PlacementInstruction>,
}

/// Select then place. Pure in (pool, viewport, obstacles, density flag).
pub fn compute_placements(
    pool: &[LabelCandidate],
    viewport: &Viewport,
    obstacles: &ObstacleSet,
    high_obstacle_density: bool,
    config: &LabelConfig,
) -> (usize, Vec<PlacedLabel>) {
    let selection = select_candidates(pool, viewport, config);
    let rules = PlacementRules::new(config, selection.zoom_factor, high_obstacle_density);
    let placed = place_labels(&selection.shortlist, obstacles, &viewport.bounds, &rules);
    (selection.shortlist.len(), placed)
}

/// A self-contained recomputation, safe to run on another thread
pub struct LabelJob {
    generation: u64,
    viewport: Viewport,
    pool: Arc<[LabelCandidate]>,
    obstacles: Arc<ObstacleSet>,
    high_obstacle_density: bool,
    config: Arc<LabelConfig>,
}

impl LabelJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn run(&self) -> LabelFrame {
        let (shortlist_len, placed) = compute_placements(
            &self.pool,
            &self.viewport,
            &self.obstacles,
            self.high_obstacle_density,
            &self.config,
        );

        let labels = placed
            .iter()
            .filter_map(|p| match PlacementInstruction::try_from(p) {
                Ok(ins) => Some(ins),
                Err(e) => {
                    warn!(label = %p.candidate.id, error = %e, "skipping label");
                    None
                }
            })
            .collect();

        LabelFrame {
            generation: self.generation,
            viewport: self.viewport,
            budget: self.config.labels_per_view(self.viewport.zoom),
            zoom_factor: self.config.zoom_factor(self.viewport.zoom),
            shortlist_len,
            placed_len: placed.len(),
            labels,
        }
    }
}

/// Owns everything a recomputation reads, and the frame currently shown.
///
/// Every `request` takes a fresh generation; `commit` only installs a frame
/// from the newest generation, so a superseded computation can never
/// overwrite a later one.
pub struct LabelLayer {
    config: Arc<LabelConfig>,
    cache: CandidateCache,
    obstacles: Arc<ObstacleSet>,
    high_obstacle_density: bool,
    generation: u64,
    current: Option<LabelFrame>,
    stale: bool,
}

impl LabelLayer {
    pub fn new(config: LabelConfig) -> Self {
        Self {
            config: Arc::new(config),
            cache: CandidateCache::new(),
            obstacles: Arc::new(ObstacleSet::empty()),
            high_obstacle_density: false,
            generation: 0,
            current: None,
            stale: true,
        }
    }

    /// Rebuild candidates if this dataset differs from the cached one
    pub fn load_dataset(&mut self, dataset: DatasetId, features: &[Feature]) -> bool {
        let rebuilt = self.cache.refresh(dataset, features, &self.config.label_property);
        if rebuilt {
            self.invalidate();
        }
        rebuilt
    }

    pub fn set_obstacles(&mut self, obstacles: ObstacleSet) {
        self.obstacles = Arc::new(obstacles);
        self.invalidate();
    }

    pub fn set_high_obstacle_density(&mut self, high: bool) {
        if self.high_obstacle_density != high {
            self.high_obstacle_density = high;
            self.invalidate();
        }
    }

    /// Inputs changed: in-flight jobs are superseded and a recompute is due
    fn invalidate(&mut self) {
        self.generation += 1;
        self.stale = true;
    }

    pub fn request(&mut self, viewport: Viewport) -> LabelJob {
        self.generation += 1;
        LabelJob {
            generation: self.generation,
            viewport,
            pool: self.cache.pool(),
            obstacles: Arc::clone(&self.obstacles),
            high_obstacle_density: self.high_obstacle_density,
            config: Arc::clone(&self.config),
        }
    }

    /// Install `frame` if it belongs to the newest request. Returns false for
    /// superseded frames, which are dropped.
    pub fn commit(&mut self, frame: LabelFrame) -> bool {
        if frame.generation != self.generation {
            debug!(
                frame = frame.generation,
                latest = self.generation,
                "discarding superseded label frame"
            );
            return false;
        }

        debug!(
            generation = frame.generation,
            zoom = frame.viewport.zoom,
            shortlist = frame.shortlist_len,
            placed = frame.placed_len,
            "label frame committed"
        );
        self.current = Some(frame);
        self.stale = false;
        true
    }

    /// Request, run and commit in one go
    pub fn recompute(&mut self, viewport: Viewport) -> &LabelFrame {
        let frame = self.request(viewport).run();
        debug!(
            generation = frame.generation,
            zoom = frame.viewport.zoom,
            shortlist = frame.shortlist_len,
            placed = frame.placed_len,
            "label frame recomputed"
        );
        self.stale = false;
        self.current.insert(frame)
    }

    pub fn current(&self) -> Option<&LabelFrame> {
        self.current.as_ref()
    }

    pub fn needs_recompute(&self) -> bool {
        self.stale
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn high_obstacle_density(&self) -> bool {
        self.high_obstacle_density
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    pub fn candidates(&self) -> Arc<[LabelCandidate]> {
        self.cache.pool()
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    pub fn dataset_version(&self) -> u64 {
        self.cache.version()
    }
}
