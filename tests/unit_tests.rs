// Unit tests for TasteSync scoring and helpers

use serde_json::{json, Map};
use tastesync::core::discovery::{
    match_score, predict_taste, price_filter_for, pros_cons, select_best, select_diverse_options, trend_score,
    twin_activity_counts,
};
use tastesync::core::gamification::{challenge_percentage, share_text, visit_milestone};
use tastesync::core::image::detect_food;
use tastesync::core::{apply_interaction, feature_vector, EMBEDDING_DIM, FEATURE_DIM};
use tastesync::models::{ActionType, Restaurant, TasteProfile};
use tastesync::services::auth::{hash_password, verify_password};
use tastesync::services::yelp_ai::enhance_query;
use tastesync::services::{InMemoryVectorIndex, JwtKeys, VectorIndex, VectorIndexError};
use uuid::Uuid;

fn restaurant(id: &str, price: &str, rating: f64, reviews: i64, category: (&str, &str)) -> Restaurant {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Restaurant {}", id),
        "price": price,
        "rating": rating,
        "review_count": reviews,
        "categories": [{ "alias": category.0, "title": category.1 }],
    }))
    .unwrap()
}

fn profile_with(cuisines: &[&str]) -> TasteProfile {
    TasteProfile {
        preferred_cuisines: cuisines.iter().map(|c| c.to_string()).collect(),
        ..TasteProfile::default()
    }
}

#[test]
fn test_match_score_perfect_fit() {
    let r = restaurant("a", "$$", 5.0, 100, ("thai", "Thai"));
    let score = match_score(&r, &profile_with(&["thai"]));
    assert!((score - 1.0).abs() < 1e-9);
}

#[test]
fn test_match_score_floor() {
    let r = restaurant("a", "$$$$", 0.0, 0, ("bbq", "Barbeque"));
    let profile = TasteProfile {
        price_sensitivity: 1.0,
        ..TasteProfile::default()
    };
    let score = match_score(&r, &profile);
    assert!((score - 0.5).abs() < 1e-9);
}

#[test]
fn test_select_best_prefers_cuisine_hit() {
    let options = vec![
        restaurant("plain", "$$", 4.0, 100, ("burgers", "Burgers")),
        restaurant("fav", "$$", 4.0, 100, ("sushi", "Sushi Bars")),
    ];
    let best = select_best(options, &profile_with(&["sushi"])).unwrap();
    assert_eq!(best.restaurant.id, "fav");
}

#[test]
fn test_diverse_options_small_input_keeps_order() {
    let options = vec![
        restaurant("one", "$", 3.0, 10, ("pizza", "Pizza")),
        restaurant("two", "$$$", 4.8, 900, ("thai", "Thai")),
    ];
    let picked = select_diverse_options(options, &profile_with(&["thai"]), 3);
    let ids: Vec<&str> = picked.iter().map(|s| s.restaurant.id.as_str()).collect();
    assert_eq!(ids, vec!["one", "two"]);
}

#[test]
fn test_pros_and_cons() {
    let r = restaurant("a", "$$", 4.7, 1200, ("thai", "Thai"));
    let (pros, cons) = pros_cons(&r, &profile_with(&["thai"]));
    assert_eq!(pros.len(), 3);
    assert!(pros[0].starts_with("Excellent rating"));
    assert!(cons.is_empty());

    let r = restaurant("b", "$$", 3.0, 10, ("bbq", "Barbeque"));
    let (_, cons) = pros_cons(&r, &profile_with(&[]));
    assert_eq!(cons, vec!["Lower rating: 3.0★", "Newer/less reviewed spot"]);
}

#[test]
fn test_predict_taste_bands() {
    let adventurous = TasteProfile {
        adventure_score: 0.9,
        ..TasteProfile::default()
    };
    assert_eq!(predict_taste(&adventurous).cuisine, "Fusion or Exotic");

    let spicy = TasteProfile {
        spice_tolerance: 0.9,
        ..TasteProfile::default()
    };
    assert_eq!(predict_taste(&spicy).cuisine, "Thai or Indian");

    let steady = profile_with(&["greek"]);
    let prediction = predict_taste(&steady);
    assert_eq!(prediction.cuisine, "greek");
    assert_eq!(prediction.restaurant_style, "casual");
    assert_eq!(prediction.confidence, 0.75);
}

#[test]
fn test_price_filter_bands() {
    assert_eq!(price_filter_for(0.9), "1,2");
    assert_eq!(price_filter_for(0.5), "2,3");
    assert_eq!(price_filter_for(0.1), "3,4");
}

#[test]
fn test_trending_counts() {
    let ids = ["a", "b", "a", "c", "b", "a"];
    let counts = twin_activity_counts(ids.iter().copied(), 2);
    assert_eq!(counts, vec![("a".to_string(), 3), ("b".to_string(), 2)]);
    assert_eq!(trend_score(3), 0.3);
    assert_eq!(trend_score(25), 1.0);
}

#[test]
fn test_feature_vector_one_hot() {
    let v = feature_vector(&TasteProfile {
        ambiance_preference: Some("lively".to_string()),
        ..profile_with(&["Middle Eastern", "unknown"])
    });
    assert_eq!(v.len(), FEATURE_DIM);
    // middle_eastern is the 12th cuisine, lively the 5th ambiance
    assert_eq!(v[4 + 11], 1.0);
    assert_eq!(v[20 + 4], 1.0);
    assert_eq!(v[4..20].iter().filter(|x| **x == 1.0).count(), 1);
    assert!(v[25..].iter().all(|x| *x == 0.0));
}

#[test]
fn test_positive_interaction_nudges_profile() {
    let mut profile = profile_with(&["thai"]);
    let r = restaurant("a", "$$$$", 4.0, 100, ("ethiopian", "Ethiopian"));

    assert!(apply_interaction(&mut profile, ActionType::Save, &r));
    assert!((profile.price_sensitivity - 0.475).abs() < 1e-9);
    assert!((profile.cuisine_diversity - 0.55).abs() < 1e-9);

    let before = profile.clone();
    assert!(!apply_interaction(&mut profile, ActionType::Dismiss, &r));
    assert_eq!(profile, before);
}

#[test]
fn test_detect_food_from_filename() {
    let found = detect_food(Some("late_night_RAMEN.png"));
    assert_eq!(found.dish, "Ramen");
    assert_eq!(found.category, "ramen");
    assert_eq!(found.confidence, 0.85);

    let fallback = detect_food(None);
    assert_eq!(fallback.dish, "Restaurant Food");
    assert_eq!(fallback.confidence, 0.6);
}

#[test]
fn test_gamification_helpers() {
    assert_eq!(challenge_percentage(1, 4), 25.0);
    assert_eq!(challenge_percentage(9, 3), 100.0);
    assert_eq!(visit_milestone(5), Some("explorer_5"));
    assert_eq!(visit_milestone(6), None);

    let text = share_text(Some(&TasteProfile::default()), 4);
    assert!(text.contains("classic mild fan with 4 Taste Twins"));
}

#[test]
fn test_enhance_query_with_preferences() {
    let profile = TasteProfile {
        price_sensitivity: 0.9,
        adventure_score: 0.2,
        ambiance_preference: Some("cozy".to_string()),
        ..profile_with(&["thai", "korean", "greek", "french"])
    };
    assert_eq!(
        enhance_query("dinner spot", &profile),
        "dinner spot. My preferences: I prefer thai, korean, greek cuisine, budget-friendly options, \
         cozy atmosphere, classic and reliable spots."
    );
}

#[test]
fn test_password_and_token_round_trip() {
    let hash = hash_password("correct horse battery").unwrap();
    assert!(verify_password("correct horse battery", &hash));
    assert!(!verify_password("wrong password", &hash));

    let keys = JwtKeys::new("integration-test-secret-key-1234567890", 24);
    let user_id = Uuid::new_v4();
    let token = keys.sign(user_id).unwrap();
    assert_eq!(keys.verify(&token).unwrap().sub, user_id);
}

#[test]
fn test_vector_index_rejects_wrong_dimension() {
    let index = InMemoryVectorIndex::new(EMBEDDING_DIM);
    let result = tokio_test::block_on(index.upsert("short", vec![0.0; 3], Map::new()));
    assert!(matches!(
        result,
        Err(VectorIndexError::DimensionMismatch { expected: 512, actual: 3 })
    ));
    assert_eq!(tokio_test::block_on(index.count()).unwrap(), 0);
}
