use crate::geo::LatLng;
use crate::labels::{DatasetId, Obstacle};
use anyhow::{bail, Result};
use geojson::{Feature, GeoJson, Geometry, JsonObject, JsonValue, Value};
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Place features plus the identity of the bytes they came from
pub struct PlaceDataset {
    pub id: DatasetId,
    pub features: Vec<Feature>,
}

/// Load a GeoJSON FeatureCollection (or single Feature) of places
pub fn load_places(path: &Path) -> Result<PlaceDataset> {
    let mut bytes = fs::read(path)?;
    // simd-json parses in place, so fingerprint first
    let id = DatasetId::from_bytes(&bytes);
    let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes)?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => bail!("{} holds a bare geometry, expected features", path.display()),
    };
    info!(path = %path.display(), features = features.len(), "loaded places");

    Ok(PlaceDataset { id, features })
}

/// One branch record; either shape is accepted, anything else is skipped
#[derive(Deserialize)]
#[serde(untagged)]
enum BranchRecord {
    Named { latitude: f64, longitude: f64 },
    /// [lat, lng]
    Coordinates { coordinates: Vec<f64> },
    Other(IgnoredAny),
}

impl BranchRecord {
    fn position(&self) -> Option<LatLng> {
        let p = match self {
            BranchRecord::Named { latitude, longitude } => LatLng::new(*latitude, *longitude),
            BranchRecord::Coordinates { coordinates } if coordinates.len() >= 2 => {
                LatLng::new(coordinates[0], coordinates[1])
            }
            _ => return None,
        };
        p.is_valid().then_some(p)
    }
}

fn obstacles_from_records(records: &[BranchRecord]) -> Vec<Obstacle> {
    records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| match record.position() {
            Some(position) => Some(Obstacle { position }),
            None => {
                warn!(record = idx, "skipping branch without usable coordinates");
                None
            }
        })
        .collect()
}

/// Load branch locations from a JSON array
pub fn load_obstacles(path: &Path) -> Result<Vec<Obstacle>> {
    let mut bytes = fs::read(path)?;
    let records: Vec<BranchRecord> = simd_json::serde::from_slice(&mut bytes)?;
    let obstacles = obstacles_from_records(&records);
    info!(
        path = %path.display(),
        records = records.len(),
        obstacles = obstacles.len(),
        "loaded branch markers"
    );
    Ok(obstacles)
}

fn place_feature(name: &str, population: u64, value: Value) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), JsonValue::from(name));
    properties.insert("population".to_string(), JsonValue::from(population));
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Built-in places used when no dataset file is given
pub fn sample_places() -> PlaceDataset {
    let cities: [(&str, u64, f64, f64); 26] = [
        ("Lisbon", 545_000, 38.7223, -9.1393),
        ("Sintra", 385_000, 38.8029, -9.3817),
        ("Vila Nova de Gaia", 303_000, 41.1239, -8.6118),
        ("Porto", 232_000, 41.1579, -8.6291),
        ("Cascais", 214_000, 38.6979, -9.4215),
        ("Loures", 201_000, 38.8309, -9.1685),
        ("Braga", 193_000, 41.5454, -8.4265),
        ("Amadora", 175_000, 38.7538, -9.2308),
        ("Matosinhos", 175_000, 41.1821, -8.6891),
        ("Almada", 174_000, 38.6790, -9.1569),
        ("Guimarães", 156_000, 41.4425, -8.2918),
        ("Odivelas", 148_000, 38.7927, -9.1838),
        ("Coimbra", 140_000, 40.2033, -8.4103),
        ("Leiria", 128_000, 39.7436, -8.8071),
        ("Setúbal", 123_000, 38.5244, -8.8882),
        ("Viseu", 99_000, 40.6566, -7.9125),
        ("Viana do Castelo", 85_000, 41.6918, -8.8344),
        ("Aveiro", 80_000, 40.6405, -8.6538),
        ("Faro", 64_000, 37.0194, -7.9304),
        ("Santarém", 58_000, 39.2362, -8.6859),
        ("Évora", 56_000, 38.5714, -7.9135),
        ("Castelo Branco", 56_000, 39.8222, -7.4909),
        ("Portimão", 55_000, 37.1366, -8.5377),
        ("Guarda", 42_000, 40.5373, -7.2676),
        ("Bragança", 35_000, 41.8061, -6.7567),
        ("Beja", 35_000, 38.0151, -7.8632),
    ];

    let mut features: Vec<Feature> = cities
        .iter()
        .map(|&(name, pop, lat, lng)| place_feature(name, pop, Value::Point(vec![lng, lat])))
        .collect();

    // A parish outline, labelled at its centroid
    features.push(place_feature(
        "Óbidos",
        11_000,
        Value::Polygon(vec![vec![
            vec![-9.20, 39.33],
            vec![-9.12, 39.33],
            vec![-9.12, 39.39],
            vec![-9.20, 39.39],
            vec![-9.20, 39.33],
        ]]),
    ));

    PlaceDataset {
        id: DatasetId::from_bytes(b"builtin:portugal-places"),
        features,
    }
}

/// Built-in branch markers matching `sample_places`
pub fn sample_obstacles() -> Vec<Obstacle> {
    [
        (38.7223, -9.1393), // on Lisbon's label anchor
        (38.7107, -9.1366),
        (38.7369, -9.1427),
        (38.7490, -9.1604),
        (41.1496, -8.6109),
        (41.1621, -8.6220),
        (40.2033, -8.4103), // on Coimbra's label anchor
        (41.5503, -8.4201),
        (37.0176, -7.9331),
        (38.5260, -8.8910),
        (39.7495, -8.8077),
        (40.6443, -8.6455),
    ]
    .into_iter()
    .map(|(lat, lng)| Obstacle {
        position: LatLng::new(lat, lng),
    })
    .collect()
}
