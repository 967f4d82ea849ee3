// Integration tests for the TasteSync matching pipeline

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde_json::json;
use tastesync::core::twins::{self, Candidate};
use tastesync::core::{calculate_taste_dna, compatibility, TasteEncoder, EMBEDDING_DIM};
use tastesync::models::{QuizAnswer, TasteDna, TasteProfile, User};
use tastesync::services::twin_matching::embedding_metadata;
use tastesync::services::{CacheKey, CacheManager, InMemoryVectorIndex, VectorIndex};
use uuid::Uuid;

fn profile(adventure: f64, spice: f64, price: f64, diversity: f64, ambiance: &str, cuisines: &[&str]) -> TasteProfile {
    TasteProfile {
        adventure_score: adventure,
        spice_tolerance: spice,
        price_sensitivity: price,
        cuisine_diversity: diversity,
        ambiance_preference: Some(ambiance.to_string()),
        preferred_cuisines: cuisines.iter().map(|c| c.to_string()).collect(),
        dietary_restrictions: Vec::new(),
    }
}

fn user(id: Uuid, name: &str) -> User {
    User {
        id,
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: String::new(),
        name: name.to_string(),
        avatar_url: None,
        embedding_vector_id: Some(id.to_string()),
        quiz_completed: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn dna(user_id: Uuid, profile: &TasteProfile) -> TasteDna {
    TasteDna {
        id: Uuid::new_v4(),
        user_id,
        adventure_score: profile.adventure_score,
        spice_tolerance: profile.spice_tolerance,
        price_sensitivity: profile.price_sensitivity,
        cuisine_diversity: profile.cuisine_diversity,
        ambiance_preference: profile.ambiance_preference.clone(),
        preferred_cuisines: profile.preferred_cuisines.clone(),
        dietary_restrictions: profile.dietary_restrictions.clone(),
        quiz_answers: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn answer(id: &str, value: Option<f64>, choice: Option<&str>) -> QuizAnswer {
    QuizAnswer {
        question_id: id.to_string(),
        answer_type: String::new(),
        value,
        choice: choice.map(str::to_string),
    }
}

#[tokio::test]
async fn test_integration_end_to_end_twin_matching() {
    let encoder = TasteEncoder::new(42);
    let index = InMemoryVectorIndex::new(EMBEDDING_DIM);

    let me = Uuid::new_v4();
    let close = Uuid::new_v4();
    let far = Uuid::new_v4();

    let mine = profile(0.8, 0.9, 0.3, 0.7, "trendy", &["thai", "korean", "indian"]);
    let near = profile(0.81, 0.9, 0.3, 0.7, "trendy", &["thai", "korean", "indian"]);
    let opposite = profile(0.1, 0.05, 0.95, 0.1, "casual", &["american"]);

    let profiles = [(me, &mine), (close, &near), (far, &opposite)];
    for (id, p) in profiles {
        index
            .upsert(&id.to_string(), encoder.encode(p), embedding_metadata(id, p, None))
            .await
            .unwrap();
    }
    assert_eq!(index.count().await.unwrap(), 3);

    let embedding = encoder.encode(&mine);
    let top_k = twins::default_top_k(index.count().await.unwrap(), 10_000);
    let hits = index.query(&embedding, top_k + 1, None).await.unwrap();

    // The querying user is its own best hit
    assert_eq!(hits[0].id, me.to_string());
    assert!((hits[0].score - 1.0).abs() < 1e-4);

    let candidates: Vec<Candidate> = hits
        .into_iter()
        .map(|h| Candidate {
            user_id: Uuid::parse_str(&h.id).unwrap(),
            score: h.score,
        })
        .collect();
    let candidates = twins::nearest_others(candidates, me, top_k);
    assert_eq!(candidates.len(), 2);
    assert!(candidates.iter().all(|c| c.user_id != me));

    let users: HashMap<Uuid, User> = [user(close, "Close"), user(far, "Far")]
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let dnas: HashMap<Uuid, TasteDna> = [dna(close, &near), dna(far, &opposite)]
        .into_iter()
        .map(|d| (d.user_id, d))
        .collect();

    let mut matches = twins::enrich(&candidates, &users, &dnas, &mine.preferred_cuisines);
    twins::sort_by_similarity(&mut matches);

    assert_eq!(matches[0].twin_id, close);
    assert_eq!(matches[0].name, "Close");
    assert_eq!(matches[0].shared_cuisines, vec!["indian", "korean", "thai"]);
    assert!(matches[0].similarity_score > matches[1].similarity_score);
    assert!(matches[1].shared_cuisines.is_empty());
}

#[tokio::test]
async fn test_integration_city_filter_limits_candidates() {
    let encoder = TasteEncoder::default();
    let index = InMemoryVectorIndex::new(EMBEDDING_DIM);
    let base = TasteProfile::default();

    let austin = Uuid::new_v4();
    let denver = Uuid::new_v4();
    index
        .upsert(&austin.to_string(), encoder.encode(&base), embedding_metadata(austin, &base, Some("Austin")))
        .await
        .unwrap();
    index
        .upsert(&denver.to_string(), encoder.encode(&base), embedding_metadata(denver, &base, Some("Denver")))
        .await
        .unwrap();

    let filter = json!({ "city": { "$eq": "Austin" } });
    let hits = index.query(&encoder.encode(&base), 10, Some(&filter)).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, austin.to_string());
}

#[test]
fn test_integration_fallback_pads_short_list() {
    let encoder = TasteEncoder::default();
    let me = Uuid::new_v4();
    let found = Uuid::new_v4();
    let mine = TasteProfile::default();

    let pool: Vec<(Uuid, Vec<f32>)> = (0..6)
        .map(|i| {
            let p = profile(0.1 * i as f64, 0.5, 0.5, 0.5, "casual", &["italian"]);
            (Uuid::new_v4(), encoder.encode(&p))
        })
        .chain([(me, encoder.encode(&mine)), (found, encoder.encode(&mine))])
        .collect();

    let exclude: HashSet<Uuid> = [found].into_iter().collect();
    let extra = twins::fallback_candidates(me, &encoder.encode(&mine), &pool, &exclude, 1, 5);

    assert_eq!(extra.len(), 4);
    assert!(extra.iter().all(|c| c.user_id != me && c.user_id != found));
    assert!(extra.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_integration_quiz_to_embedding() {
    let answers = vec![
        answer("swipe_1", None, Some("right")),
        answer("swipe_2", None, Some("right")),
        answer("swipe_5", None, Some("left")),
        answer("spice_tolerance", Some(0.8), None),
        answer("price_range", Some(0.2), None),
        answer("ambiance_pref", None, Some("cozy")),
        answer("preferred_cuisines", None, Some("thai,japanese")),
        answer("dietary_restrictions", None, Some("none")),
    ];

    let profile = calculate_taste_dna(&answers);
    assert_eq!(profile.adventure_score, 0.8);
    assert_eq!(profile.spice_tolerance, 0.8);
    assert_eq!(profile.price_sensitivity, 0.2);
    assert_eq!(profile.cuisine_diversity, 0.5);
    assert_eq!(profile.ambiance_preference.as_deref(), Some("cozy"));
    assert_eq!(profile.preferred_cuisines, vec!["thai", "japanese"]);
    assert!(profile.dietary_restrictions.is_empty());

    let embedding = TasteEncoder::new(7).encode(&profile);
    let norm: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
    assert_eq!(embedding.len(), EMBEDDING_DIM);
    assert!((norm - 1.0).abs() < 1e-4);
}

#[test]
fn test_integration_date_night_compatibility() {
    let a = profile(0.8, 0.6, 0.4, 0.7, "cozy", &["italian", "thai"]);
    let b = profile(0.8, 0.6, 0.4, 0.7, "cozy", &["thai", "mexican"]);

    let result = compatibility(&a, &b);
    assert_eq!(result.score, 1.0);
    assert_eq!(result.common_cuisines, vec!["thai"]);
    assert!(result.differences.is_empty());

    let c = profile(0.1, 0.0, 0.9, 0.2, "lively", &["american"]);
    let result = compatibility(&a, &c);
    assert!(result.score < 0.5);
    assert_eq!(result.merged.spice_tolerance, 0.0);
    assert_eq!(result.differences.len(), 3);
}

#[tokio::test]
async fn test_integration_twin_cache_invalidation() {
    let cache = CacheManager::in_memory(100, 900);
    let me = Uuid::new_v4().to_string();
    let key = CacheKey::twins(&me);

    cache.set(&key, &vec!["twin-a".to_string()]).await.unwrap();
    assert_eq!(cache.get_or_none::<Vec<String>>(&key).await, Some(vec!["twin-a".to_string()]));

    cache.invalidate(&key).await;
    assert!(cache.get_or_none::<Vec<String>>(&key).await.is_none());
}
