// Criterion benchmarks for TasteSync

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::Map;
use tastesync::core::features::CUISINE_TYPES;
use tastesync::core::twins::{self, Candidate};
use tastesync::core::{cosine_similarity, feature_vector, TasteEncoder, EMBEDDING_DIM};
use tastesync::models::TasteProfile;
use tastesync::services::{InMemoryVectorIndex, VectorIndex};
use uuid::Uuid;

fn create_profile(i: usize) -> TasteProfile {
    TasteProfile {
        adventure_score: (i % 10) as f64 / 10.0,
        spice_tolerance: (i % 7) as f64 / 7.0,
        price_sensitivity: (i % 5) as f64 / 5.0,
        cuisine_diversity: (i % 3) as f64 / 3.0,
        ambiance_preference: Some("casual".to_string()),
        preferred_cuisines: vec![
            CUISINE_TYPES[i % CUISINE_TYPES.len()].to_string(),
            CUISINE_TYPES[(i * 7) % CUISINE_TYPES.len()].to_string(),
        ],
        dietary_restrictions: vec![],
    }
}

fn bench_feature_vector(c: &mut Criterion) {
    let profile = create_profile(3);
    c.bench_function("feature_vector", |b| b.iter(|| feature_vector(black_box(&profile))));
}

fn bench_encoder(c: &mut Criterion) {
    let encoder = TasteEncoder::new(42);
    let profile = create_profile(7);

    c.bench_function("encoder_encode", |b| b.iter(|| encoder.encode(black_box(&profile))));
    c.bench_function("encoder_new", |b| b.iter(|| TasteEncoder::new(black_box(42))));
}

fn bench_cosine_similarity(c: &mut Criterion) {
    let encoder = TasteEncoder::new(42);
    let a = encoder.encode(&create_profile(1));
    let b = encoder.encode(&create_profile(2));

    c.bench_function("cosine_similarity_512", |bench| {
        bench.iter(|| cosine_similarity(black_box(&a), black_box(&b)))
    });
}

fn bench_in_memory_query(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let encoder = TasteEncoder::new(42);
    let query = encoder.encode(&create_profile(0));

    let mut group = c.benchmark_group("in_memory_query");

    for user_count in [100, 1_000, 10_000].iter() {
        let index = InMemoryVectorIndex::new(EMBEDDING_DIM);
        runtime.block_on(async {
            for i in 0..*user_count {
                index
                    .upsert(&Uuid::new_v4().to_string(), encoder.encode(&create_profile(i)), Map::new())
                    .await
                    .unwrap();
            }
        });

        group.bench_with_input(BenchmarkId::new("top_20", user_count), user_count, |b, _| {
            b.iter(|| runtime.block_on(index.query(black_box(&query), 20, None)).unwrap());
        });
    }

    group.finish();
}

fn bench_fallback_candidates(c: &mut Criterion) {
    let encoder = TasteEncoder::new(42);
    let me = Uuid::new_v4();
    let embedding = encoder.encode(&create_profile(0));
    let pool: Vec<(Uuid, Vec<f32>)> = (0..500)
        .map(|i| (Uuid::new_v4(), encoder.encode(&create_profile(i))))
        .collect();
    let exclude = Default::default();

    c.bench_function("fallback_candidates_500", |b| {
        b.iter(|| {
            let extra: Vec<Candidate> =
                twins::fallback_candidates(me, black_box(&embedding), black_box(&pool), &exclude, 0, 5);
            black_box(extra)
        });
    });
}

criterion_group!(
    benches,
    bench_feature_vector,
    bench_encoder,
    bench_cosine_similarity,
    bench_in_memory_query,
    bench_fallback_candidates
);

criterion_main!(benches);
