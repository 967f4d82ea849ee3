//! Restaurant scoring against a taste profile.
//!
//! Everything here is pure: callers fetch restaurants and twins, these
//! functions rank and describe them.

use serde::Serialize;

use crate::models::{Restaurant, TasteProfile, TwinMatch};

/// Twins above this similarity count as endorsements
pub const STRONG_TWIN_THRESHOLD: f64 = 0.7;

const DEFAULT_RATING: f64 = 3.5;
const BASE_SCORE: f64 = 0.5;
const PRICE_WEIGHT: f64 = 0.2;
const RATING_WEIGHT: f64 = 0.2;
const CUISINE_HIT: f64 = 0.1;
const CUISINE_CAP: f64 = 0.3;

/// How well a restaurant fits a profile, in `[0.5, 1.0]`.
///
/// Base 0.5, plus up to 0.2 for price fit, up to 0.2 for rating, and 0.1 per
/// category alias found in the preferred cuisines (at most 0.3).
pub fn match_score(restaurant: &Restaurant, profile: &TasteProfile) -> f64 {
    let mut score = BASE_SCORE;

    let price_diff = (profile.price_sensitivity - (1.0 - restaurant.price_level())).abs();
    score += (1.0 - price_diff) * PRICE_WEIGHT;

    score += (restaurant.rating_or(DEFAULT_RATING) / 5.0) * RATING_WEIGHT;

    let preferred: Vec<String> = profile.preferred_cuisines.iter().map(|c| c.to_lowercase()).collect();
    let mut aliases = restaurant.category_aliases();
    aliases.sort_unstable();
    aliases.dedup();
    let hits = aliases.iter().filter(|a| preferred.iter().any(|p| p == *a)).count();
    score += (hits as f64 * CUISINE_HIT).min(CUISINE_CAP);

    score.min(1.0)
}

/// Number of twins similar enough to endorse a pick
pub fn strong_twin_count(twins: &[TwinMatch]) -> usize {
    twins
        .iter()
        .filter(|t| t.similarity_score > STRONG_TWIN_THRESHOLD)
        .count()
}

/// Yelp price filter for a price sensitivity
pub fn price_filter_for(price_sensitivity: f64) -> &'static str {
    if price_sensitivity > 0.7 {
        "1,2"
    } else if price_sensitivity > 0.4 {
        "2,3"
    } else {
        "3,4"
    }
}

/// Restaurant paired with its match score
#[derive(Debug, Clone)]
pub struct Scored {
    pub restaurant: Restaurant,
    pub score: f64,
}

/// Score every restaurant and sort best first. Ties keep input order.
pub fn rank(restaurants: Vec<Restaurant>, profile: &TasteProfile) -> Vec<Scored> {
    let mut scored: Vec<Scored> = restaurants
        .into_iter()
        .map(|restaurant| {
            let score = match_score(&restaurant, profile);
            Scored { restaurant, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

pub fn select_best(restaurants: Vec<Restaurant>, profile: &TasteProfile) -> Option<Scored> {
    rank(restaurants, profile).into_iter().next()
}

/// Pick `count` options that differ from each other.
///
/// Slot one is the best match, slot two the best of the next nine with a
/// different price, slot three the best of the next nine sharing no category
/// with the first. Remaining slots are filled by score. With `count` or
/// fewer candidates all are returned, scored but in input order.
pub fn select_diverse_options(restaurants: Vec<Restaurant>, profile: &TasteProfile, count: usize) -> Vec<Scored> {
    if restaurants.len() <= count {
        return restaurants
            .into_iter()
            .map(|restaurant| {
                let score = match_score(&restaurant, profile);
                Scored { restaurant, score }
            })
            .collect();
    }

    let ranked = rank(restaurants, profile);
    let window = ranked.len().min(10);
    let mut picked: Vec<usize> = vec![0];

    let best = &ranked[0].restaurant;
    if let Some(idx) = (1..window).find(|&i| ranked[i].restaurant.price != best.price) {
        picked.push(idx);
    }

    let best_categories = best.category_aliases();
    if let Some(idx) = (1..window).find(|&i| {
        !picked.contains(&i)
            && !ranked[i]
                .restaurant
                .category_aliases()
                .iter()
                .any(|alias| best_categories.contains(alias))
    }) {
        picked.push(idx);
    }

    for i in 0..ranked.len() {
        if picked.len() >= count {
            break;
        }
        if !picked.contains(&i) {
            picked.push(i);
        }
    }
    picked.truncate(count);

    let mut slots: Vec<Option<Scored>> = ranked.into_iter().map(Some).collect();
    picked.into_iter().filter_map(|i| slots[i].take()).collect()
}

fn favourite_category<'a>(restaurant: &'a Restaurant, profile: &TasteProfile) -> Option<&'a str> {
    restaurant.category_titles().into_iter().find(|title| {
        let title = title.to_lowercase();
        profile
            .preferred_cuisines
            .iter()
            .any(|p| title.contains(&p.to_lowercase()))
    })
}

/// Up to three pros and two cons of a restaurant for this profile
pub fn pros_cons(restaurant: &Restaurant, profile: &TasteProfile) -> (Vec<String>, Vec<String>) {
    let mut pros = Vec::new();
    let mut cons = Vec::new();

    if let Some(rating) = restaurant.rating {
        if rating >= 4.5 {
            pros.push(format!("Excellent rating: {:.1}★", rating));
        } else if rating < 3.5 {
            cons.push(format!("Lower rating: {:.1}★", rating));
        }
    }

    let reviews = restaurant.review_count.unwrap_or(0);
    if reviews > 500 {
        pros.push("Very popular with many reviews".to_string());
    } else if reviews < 50 {
        cons.push("Newer/less reviewed spot".to_string());
    }

    let price = restaurant.price_or_default();
    let price_level = restaurant.price_level();
    if (profile.price_sensitivity - (1.0 - price_level)).abs() < 0.2 {
        pros.push(format!("Price ({}) matches your preference", price));
    } else if price_level > 0.7 && profile.price_sensitivity > 0.6 {
        cons.push("Might be pricier than preferred".to_string());
    }

    if let Some(category) = favourite_category(restaurant, profile) {
        pros.push(format!("Serves your favorite: {}", category));
    }

    pros.truncate(3);
    cons.truncate(2);
    (pros, cons)
}

/// Human readable reasons, joined with " • "
pub fn explanation(restaurant: &Restaurant, score: f64, profile: &TasteProfile, twins: &[TwinMatch]) -> String {
    let mut parts = vec![format!("{}% match with your TasteDNA", (score * 100.0) as i64)];

    if let Some(category) = favourite_category(restaurant, profile) {
        parts.push(format!("Features your favorite cuisine: {}", category));
    }

    parts.push(format!(
        "Price point ({}) aligns with your preferences",
        restaurant.price_or_default()
    ));

    let strong = strong_twin_count(twins);
    if strong > 0 {
        parts.push(format!("{} Taste Twins love similar restaurants", strong));
    }

    parts.join(" • ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchFactor {
    pub factor: &'static str,
    pub score: f64,
    pub description: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-factor breakdown for the explain endpoint
pub fn explain_factors(restaurant: &Restaurant, profile: &TasteProfile) -> Vec<MatchFactor> {
    let price = restaurant.price_or_default();
    let price_match = 1.0 - (profile.price_sensitivity - restaurant.price_level()).abs();
    let rating = restaurant.rating_or(DEFAULT_RATING);
    let titles = restaurant.category_titles();

    vec![
        MatchFactor {
            factor: "Price",
            score: round2(price_match),
            description: format!(
                "Price point ({}) {} your preference",
                price,
                if price_match > 0.7 { "matches" } else { "partially matches" }
            ),
        },
        MatchFactor {
            factor: "Rating",
            score: round2(rating / 5.0),
            description: format!("Rated {:.1}★ by Yelp users", rating),
        },
        MatchFactor {
            factor: "Cuisine",
            score: if favourite_category(restaurant, profile).is_some() { 1.0 } else { 0.5 },
            description: format!(
                "Serves {}",
                titles.iter().take(2).copied().collect::<Vec<_>>().join(", ")
            ),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TastePrediction {
    pub cuisine: String,
    pub restaurant_style: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// Guess what the user will crave next from their profile alone
pub fn predict_taste(profile: &TasteProfile) -> TastePrediction {
    let (cuisine, style, reasoning) = if profile.adventure_score > 0.7 {
        (
            "Fusion or Exotic".to_string(),
            "Adventurous & Unique".to_string(),
            "Your high adventure score suggests you'll enjoy trying something new!",
        )
    } else if profile.spice_tolerance > 0.7 {
        (
            "Thai or Indian".to_string(),
            "Spicy & Flavorful".to_string(),
            "Your spice tolerance indicates you might crave bold flavors.",
        )
    } else {
        (
            profile
                .preferred_cuisines
                .first()
                .cloned()
                .unwrap_or_else(|| "Comfort Food".to_string()),
            profile
                .ambiance_preference
                .clone()
                .unwrap_or_else(|| "Casual".to_string()),
            "Based on your consistent preferences, you'll likely enjoy your favorites.",
        )
    };

    TastePrediction {
        cuisine,
        restaurant_style: style,
        confidence: 0.75,
        reasoning: reasoning.to_string(),
    }
}

/// Restaurants ranked by how often twins acted on them, at most `limit`.
///
/// Ties keep the order in which a restaurant was first seen.
pub fn twin_activity_counts<'a, I>(restaurant_ids: I, limit: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for id in restaurant_ids {
        match counts.iter_mut().find(|(seen, _)| seen == id) {
            Some((_, n)) => *n += 1,
            None => counts.push((id.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

/// Share of ten twin actions, capped at 1
pub fn trend_score(count: usize) -> f64 {
    (count as f64 / 10.0).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use uuid::Uuid;

    fn restaurant(id: &str, price: Option<&str>, rating: Option<f64>, cats: &[(&str, &str)]) -> Restaurant {
        Restaurant {
            id: id.to_string(),
            name: id.to_uppercase(),
            rating,
            review_count: Some(100),
            price: price.map(str::to_string),
            categories: cats
                .iter()
                .map(|(alias, title)| Category { alias: alias.to_string(), title: title.to_string() })
                .collect(),
            extra: Default::default(),
        }
    }

    fn profile(price_sensitivity: f64, cuisines: &[&str]) -> TasteProfile {
        TasteProfile {
            price_sensitivity,
            preferred_cuisines: cuisines.iter().map(|c| c.to_string()).collect(),
            ..TasteProfile::default()
        }
    }

    fn twin(similarity: f64) -> TwinMatch {
        TwinMatch {
            twin_id: Uuid::new_v4(),
            name: "Twin".to_string(),
            email: "twin@example.com".to_string(),
            avatar_url: None,
            similarity_score: similarity,
            shared_cuisines: vec![],
            adventure_score: 0.5,
            spice_tolerance: 0.5,
        }
    }

    #[test]
    fn test_match_score_components() {
        // price $$ -> level 0.5; sensitivity 0.5 -> diff 0 -> +0.2
        // rating 4.0 -> +0.16; one cuisine hit -> +0.1
        let r = restaurant("a", Some("$$"), Some(4.0), &[("thai", "Thai")]);
        let score = match_score(&r, &profile(0.5, &["Thai"]));
        assert!((score - 0.96).abs() < 1e-9);
    }

    #[test]
    fn test_match_score_defaults_and_cap() {
        let r = restaurant("a", None, None, &[]);
        let score = match_score(&r, &profile(0.5, &[]));
        assert!((score - (0.5 + 0.2 + 0.14)).abs() < 1e-9);

        let r = restaurant(
            "b",
            Some("$$"),
            Some(5.0),
            &[("thai", "Thai"), ("korean", "Korean"), ("indian", "Indian"), ("chinese", "Chinese")],
        );
        let score = match_score(&r, &profile(0.5, &["thai", "korean", "indian", "chinese"]));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_price_filter_bands() {
        assert_eq!(price_filter_for(0.9), "1,2");
        assert_eq!(price_filter_for(0.7), "2,3");
        assert_eq!(price_filter_for(0.41), "2,3");
        assert_eq!(price_filter_for(0.4), "3,4");
    }

    #[test]
    fn test_select_best_prefers_higher_score() {
        let picked = select_best(
            vec![
                restaurant("low", Some("$$$$"), Some(3.0), &[]),
                restaurant("high", Some("$$"), Some(4.8), &[("thai", "Thai")]),
            ],
            &profile(0.5, &["thai"]),
        )
        .unwrap();
        assert_eq!(picked.restaurant.id, "high");
    }

    #[test]
    fn test_diverse_options_vary_price_and_category() {
        let p = profile(0.5, &["thai"]);
        let options = select_diverse_options(
            vec![
                restaurant("best", Some("$$"), Some(5.0), &[("thai", "Thai")]),
                restaurant("same", Some("$$"), Some(4.9), &[("thai", "Thai")]),
                restaurant("pricey", Some("$$$"), Some(4.9), &[("thai", "Thai")]),
                restaurant("other", Some("$$"), Some(4.0), &[("pizza", "Pizza")]),
                restaurant("filler", Some("$$"), Some(2.0), &[("thai", "Thai")]),
            ],
            &p,
            3,
        );

        let ids: Vec<&str> = options.iter().map(|o| o.restaurant.id.as_str()).collect();
        assert_eq!(ids, vec!["best", "pricey", "other"]);
    }

    #[test]
    fn test_diverse_options_fill_remaining() {
        let p = profile(0.5, &[]);
        let options = select_diverse_options(
            vec![
                restaurant("a", Some("$$"), Some(5.0), &[("x", "X")]),
                restaurant("b", Some("$$"), Some(4.5), &[("x", "X")]),
                restaurant("c", Some("$$"), Some(4.0), &[("x", "X")]),
                restaurant("d", Some("$$"), Some(3.0), &[("x", "X")]),
            ],
            &p,
            3,
        );
        let ids: Vec<&str> = options.iter().map(|o| o.restaurant.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diverse_options_small_input_returned_whole() {
        let options = select_diverse_options(
            vec![restaurant("only", Some("$"), Some(4.0), &[])],
            &profile(0.5, &[]),
            3,
        );
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_pros_cons_limits() {
        let mut r = restaurant("a", Some("$$"), Some(4.7), &[("thai", "Thai")]);
        r.review_count = Some(900);
        let (pros, cons) = pros_cons(&r, &profile(0.5, &["thai"]));
        assert_eq!(pros.len(), 3);
        assert_eq!(pros[0], "Excellent rating: 4.7★");
        assert!(cons.is_empty());

        let mut r = restaurant("b", Some("$$$$"), Some(3.0), &[]);
        r.review_count = Some(10);
        let (_, cons) = pros_cons(&r, &profile(0.9, &[]));
        assert_eq!(cons.len(), 2);
        assert_eq!(cons[0], "Lower rating: 3.0★");
    }

    #[test]
    fn test_explanation_mentions_twins() {
        let r = restaurant("a", Some("$"), Some(4.0), &[("thai", "Thai")]);
        let text = explanation(&r, 0.876, &profile(0.9, &["thai"]), &[twin(0.9), twin(0.5)]);
        assert_eq!(
            text,
            "87% match with your TasteDNA • Features your favorite cuisine: Thai • \
             Price point ($) aligns with your preferences • 1 Taste Twins love similar restaurants"
        );
    }

    #[test]
    fn test_explain_factors() {
        let r = restaurant("a", Some("$$"), Some(4.5), &[("sushi", "Sushi Bars")]);
        let factors = explain_factors(&r, &profile(0.5, &["sushi"]));
        assert_eq!(factors[0].score, 1.0);
        assert_eq!(factors[1].score, 0.9);
        assert_eq!(factors[2].score, 1.0);
        assert_eq!(factors[2].description, "Serves Sushi Bars");
    }

    #[test]
    fn test_predict_taste_branches() {
        let adventurous = TasteProfile { adventure_score: 0.8, ..TasteProfile::default() };
        assert_eq!(predict_taste(&adventurous).cuisine, "Fusion or Exotic");

        let spicy = TasteProfile { spice_tolerance: 0.9, ..TasteProfile::default() };
        assert_eq!(predict_taste(&spicy).cuisine, "Thai or Indian");

        let steady = profile(0.5, &["greek"]);
        let prediction = predict_taste(&steady);
        assert_eq!(prediction.cuisine, "greek");
        assert_eq!(prediction.restaurant_style, "casual");
    }

    #[test]
    fn test_twin_activity_counts() {
        let ids = ["b", "a", "b", "c", "a", "b"];
        let counts = twin_activity_counts(ids.iter().copied(), 2);
        assert_eq!(counts, vec![("b".to_string(), 3), ("a".to_string(), 2)]);

        assert_eq!(trend_score(3), 0.3);
        assert_eq!(trend_score(25), 1.0);
    }
}
