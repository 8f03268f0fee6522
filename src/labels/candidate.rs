use crate::geo::LatLng;
use crate::hash::fingerprint;
use geojson::{feature::Id, Feature, JsonValue, Value};
use glam::DVec2;
use rayon::prelude::*;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// A populated place eligible for a label. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelCandidate {
    /// Display text
    pub id: String,
    pub population: u64,
    pub center: LatLng,
}

/// Why a feature could not be turned into a candidate
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("unsupported geometry type {0}")]
    Unsupported(&'static str),
    #[error("geometry has no coordinates")]
    Empty,
    #[error("malformed position {0:?}")]
    MalformedPosition(Vec<f64>),
}

/// Identity of a loaded dataset, derived from its raw bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DatasetId(pub u64);

impl DatasetId {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(fingerprint(bytes))
    }
}

/// Read the population attribute. Numbers and numeric strings are accepted.
fn population(props: &geojson::JsonObject) -> Option<u64> {
    let raw = match props.get("population")? {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if raw.is_finite() && raw >= 0.0 {
        Some(raw.round() as u64)
    } else {
        None
    }
}

/// Label text from the configured property, falling back to the feature id
fn label_text(feature: &Feature, label_property: &str) -> Option<String> {
    let from_props = feature
        .properties
        .as_ref()
        .and_then(|p| p.get(label_property))
        .and_then(|v| match v {
            JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        });

    from_props.or_else(|| match &feature.id {
        Some(Id::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Id::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// GeoJSON positions are [lng, lat, ...]
fn position(p: &[f64]) -> Result<LatLng, FeatureError> {
    if p.len() < 2 {
        return Err(FeatureError::MalformedPosition(p.to_vec()));
    }
    let ll = LatLng::new(p[1], p[0]);
    if ll.is_valid() {
        Ok(ll)
    } else {
        Err(FeatureError::MalformedPosition(p.to_vec()))
    }
}

fn first_vertex(positions: &[Vec<f64>]) -> Result<LatLng, FeatureError> {
    positions.first().ok_or(FeatureError::Empty).and_then(|p| position(p))
}

/// Area-weighted centroid of one or more polygons (holes subtract).
/// Degenerate (zero-area) input falls back to the mean exterior vertex.
fn polygon_centroid(polygons: &[Vec<Vec<Vec<f64>>>]) -> Result<LatLng, FeatureError> {
    let mut weighted = DVec2::ZERO;
    let mut total_area = 0.0;
    let mut vertex_sum = DVec2::ZERO;
    let mut vertex_count = 0usize;

    for rings in polygons {
        for (ring_idx, ring) in rings.iter().enumerate() {
            let pts = ring
                .iter()
                .map(|p| position(p).map(|ll| DVec2::new(ll.lng, ll.lat)))
                .collect::<Result<Vec<_>, _>>()?;
            if pts.is_empty() {
                continue;
            }

            if ring_idx == 0 {
                vertex_sum += pts.iter().copied().sum::<DVec2>();
                vertex_count += pts.len();
            }

            let mut twice_area = 0.0;
            let mut moment = DVec2::ZERO;
            for (i, &a) in pts.iter().enumerate() {
                let b = pts[(i + 1) % pts.len()];
                let cross = a.perp_dot(b);
                twice_area += cross;
                moment += (a + b) * cross;
            }
            if twice_area.abs() < f64::EPSILON {
                continue;
            }

            let area = twice_area.abs() * 0.5;
            let centroid = moment / (3.0 * twice_area);
            let sign = if ring_idx == 0 { 1.0 } else { -1.0 };
            weighted += centroid * area * sign;
            total_area += area * sign;
        }
    }

    if vertex_count == 0 {
        return Err(FeatureError::Empty);
    }

    let c = if total_area > f64::EPSILON {
        weighted / total_area
    } else {
        vertex_sum / vertex_count as f64
    };
    Ok(LatLng::new(c.y, c.x))
}

/// Representative point used to anchor a feature's label
pub fn representative_center(value: &Value) -> Result<LatLng, FeatureError> {
    match value {
        Value::Point(p) => position(p),
        Value::Polygon(rings) => polygon_centroid(std::slice::from_ref(rings)),
        Value::MultiPolygon(polygons) => polygon_centroid(polygons),
        Value::LineString(line) => first_vertex(line),
        Value::MultiPoint(points) => first_vertex(points),
        Value::MultiLineString(lines) => {
            lines.first().ok_or(FeatureError::Empty).and_then(|l| first_vertex(l))
        }
        Value::GeometryCollection(_) => Err(FeatureError::Unsupported("GeometryCollection")),
    }
}

/// Turn one feature into a candidate.
/// `Ok(None)` means the feature is simply not a labelled place (no population
/// or no text); `Err` means its geometry is unusable.
pub fn preprocess_feature(
    feature: &Feature,
    label_property: &str,
) -> Result<Option<LabelCandidate>, FeatureError> {
    let Some(population) = feature.properties.as_ref().and_then(population) else {
        return Ok(None);
    };
    let Some(id) = label_text(feature, label_property) else {
        return Ok(None);
    };
    let geometry = feature.geometry.as_ref().ok_or(FeatureError::MissingGeometry)?;
    let center = representative_center(&geometry.value)?;

    Ok(Some(LabelCandidate { id, population, center }))
}

/// Build the candidate pool. Bad features are logged and skipped; input
/// order is preserved.
pub fn preprocess(features: &[Feature], label_property: &str) -> Vec<LabelCandidate> {
    features
        .par_iter()
        .enumerate()
        .filter_map(|(idx, feature)| match preprocess_feature(feature, label_property) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(feature = idx, error = %e, "dropping feature");
                None
            }
        })
        .collect()
}

/// Candidate pool keyed by the dataset it was built from.
/// Only `refresh` writes the pool; readers share it through `Arc`.
pub struct CandidateCache {
    dataset: Option<DatasetId>,
    version: u64,
    pool: Arc<[LabelCandidate]>,
}

impl CandidateCache {
    pub fn new() -> Self {
        Self {
            dataset: None,
            version: 0,
            pool: Arc::from(Vec::new()),
        }
    }

    /// Rebuild the pool if `dataset` differs from the cached one.
    /// Returns true when a rebuild happened.
    pub fn refresh(&mut self, dataset: DatasetId, features: &[Feature], label_property: &str) -> bool {
        if self.dataset == Some(dataset) {
            return false;
        }

        let pool = preprocess(features, label_property);
        info!(
            dataset = dataset.0,
            features = features.len(),
            candidates = pool.len(),
            "built label candidate pool"
        );
        self.pool = pool.into();
        self.dataset = Some(dataset);
        self.version += 1;
        true
    }

    pub fn pool(&self) -> Arc<[LabelCandidate]> {
        Arc::clone(&self.pool)
    }

    pub fn dataset(&self) -> Option<DatasetId> {
        self.dataset
    }

    /// Bumped on every rebuild
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for CandidateCache {
    fn default() -> Self {
        Self::new()
    }
}
