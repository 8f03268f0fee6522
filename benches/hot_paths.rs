use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geojson::{Feature, Geometry, JsonObject, JsonValue, Value};
use label_map::config::LabelConfig;
use label_map::geo::{LatLng, LatLngBounds};
use label_map::labels::{compute_placements, preprocess, Obstacle, ObstacleSet, Viewport};

/// Deterministic pseudo-random grid of places over Iberia
fn synthetic_places(n: usize) -> Vec<Feature> {
    (0..n)
        .map(|i| {
            let lat = 36.0 + (i % 300) as f64 * 0.02 + (i as f64 * 0.618).fract() * 0.01;
            let lng = -9.5 + (i / 300) as f64 * 0.03 + (i as f64 * 0.414).fract() * 0.01;
            let mut props = JsonObject::new();
            props.insert("id".into(), JsonValue::from(format!("place-{i}")));
            props.insert("population".into(), JsonValue::from((i * 7919 % 250_000) as u64));
            let value = if i % 4 == 0 {
                let d = 0.005;
                Value::Polygon(vec![vec![
                    vec![lng - d, lat - d],
                    vec![lng + d, lat - d],
                    vec![lng + d, lat + d],
                    vec![lng - d, lat + d],
                    vec![lng - d, lat - d],
                ]])
            } else {
                Value::Point(vec![lng, lat])
            };
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(value)),
                id: None,
                properties: Some(props),
                foreign_members: None,
            }
        })
        .collect()
}

fn bench_preprocess(c: &mut Criterion) {
    let features = synthetic_places(20_000);
    c.bench_function("preprocess_20k", |b| {
        b.iter(|| preprocess(black_box(&features), "id"))
    });
}

fn bench_select_and_place(c: &mut Criterion) {
    let pool = preprocess(&synthetic_places(20_000), "id");
    let obstacles = ObstacleSet::new((0..2_000).map(|i| Obstacle {
        position: LatLng::new(36.0 + (i % 100) as f64 * 0.06, -9.5 + (i / 100) as f64 * 0.15),
    }));
    let config = LabelConfig::default();
    let viewport = Viewport {
        bounds: LatLngBounds::from_corners(LatLng::new(38.0, -9.5), LatLng::new(40.0, -7.0)),
        zoom: 7.0,
    };

    c.bench_function("select_and_place", |b| {
        b.iter(|| {
            compute_placements(
                black_box(&pool),
                black_box(&viewport),
                &obstacles,
                true,
                &config,
            )
        })
    });
}

criterion_group!(benches, bench_preprocess, bench_select_and_place);
criterion_main!(benches);
