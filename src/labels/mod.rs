//! Viewport-adaptive place labels.
//!
//! Features are turned into candidates once per dataset; each finished pan or
//! zoom then selects a shortlist for the view and greedily places labels clear
//! of each other and of foreground markers.

mod candidate;
mod instruction;
mod layer;
mod place;
mod select;
mod spatial;
mod viewport;

pub use candidate::{
    preprocess, preprocess_feature, representative_center, CandidateCache, DatasetId,
    FeatureError, LabelCandidate,
};
pub use instruction::{LabelError, PlacementInstruction};
pub use layer::{compute_placements, LabelFrame, LabelJob, LabelLayer};
pub use place::{place_labels, Obstacle, ObstacleSet, PlacedLabel, PlacementRules};
pub use select::{select_candidates, Selection};
pub use spatial::SpatialGrid;
pub use viewport::{
    MapHost, Subscription, SubscriptionId, ViewChange, ViewEventHub, ViewEventKind, Viewport,
    ViewportTracker,
};
