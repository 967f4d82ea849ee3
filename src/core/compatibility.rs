//! Date-night compatibility between two taste profiles

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{Restaurant, TasteProfile};

const DIFFERENCE_THRESHOLD: f64 = 0.3;
const BOTH_LOVE_THRESHOLD: f64 = 0.7;
const PREFERENCE_MARGIN: f64 = 0.15;

/// Preferences a couple can plan around
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPreferences {
    pub adventure_score: f64,
    /// The lower of the two; nobody gets dragged into heat they dislike
    pub spice_tolerance: f64,
    pub price_sensitivity: f64,
    pub cuisine_diversity: f64,
    pub preferred_cuisines: Vec<String>,
    pub ambiance_preference: Option<String>,
}

impl MergedPreferences {
    pub fn as_profile(&self) -> TasteProfile {
        TasteProfile {
            adventure_score: self.adventure_score,
            spice_tolerance: self.spice_tolerance,
            price_sensitivity: self.price_sensitivity,
            cuisine_diversity: self.cuisine_diversity,
            ambiance_preference: self.ambiance_preference.clone(),
            preferred_cuisines: self.preferred_cuisines.clone(),
            dietary_restrictions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compatibility {
    pub score: f64,
    pub common_cuisines: Vec<String>,
    pub merged: MergedPreferences,
    pub differences: Vec<String>,
}

fn dedup_ordered<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|c| seen.insert(c.as_str())).cloned().collect()
}

fn common_cuisines(a: &TasteProfile, b: &TasteProfile) -> Vec<String> {
    dedup_ordered(a.preferred_cuisines.iter().filter(|c| b.preferred_cuisines.contains(c)))
}

fn all_cuisines(a: &TasteProfile, b: &TasteProfile) -> Vec<String> {
    dedup_ordered(a.preferred_cuisines.iter().chain(b.preferred_cuisines.iter()))
}

/// Score two profiles against each other.
///
/// Starts at one minus the mean absolute difference of the four scores,
/// adds 0.1 per shared cuisine and 0.1 for matching ambiance (each step
/// capped at 1.0), then rounds to two decimals.
pub fn compatibility(a: &TasteProfile, b: &TasteProfile) -> Compatibility {
    let adventure_diff = (a.adventure_score - b.adventure_score).abs();
    let spice_diff = (a.spice_tolerance - b.spice_tolerance).abs();
    let price_diff = (a.price_sensitivity - b.price_sensitivity).abs();
    let diversity_diff = (a.cuisine_diversity - b.cuisine_diversity).abs();

    let mut score = 1.0 - (adventure_diff + spice_diff + price_diff + diversity_diff) / 4.0;

    let common = common_cuisines(a, b);
    if !common.is_empty() {
        score = (score + 0.1 * common.len() as f64).min(1.0);
    }
    if a.ambiance_preference == b.ambiance_preference {
        score = (score + 0.1).min(1.0);
    }

    let preferred_cuisines = if common.is_empty() {
        all_cuisines(a, b).into_iter().take(5).collect()
    } else {
        common.clone()
    };

    let merged = MergedPreferences {
        adventure_score: (a.adventure_score + b.adventure_score) / 2.0,
        spice_tolerance: a.spice_tolerance.min(b.spice_tolerance),
        price_sensitivity: (a.price_sensitivity + b.price_sensitivity) / 2.0,
        cuisine_diversity: (a.cuisine_diversity + b.cuisine_diversity) / 2.0,
        preferred_cuisines,
        ambiance_preference: a.ambiance_preference.clone().or_else(|| b.ambiance_preference.clone()),
    };

    let mut differences = Vec::new();
    if adventure_diff > DIFFERENCE_THRESHOLD {
        differences.push("Adventure levels differ".to_string());
    }
    if spice_diff > DIFFERENCE_THRESHOLD {
        differences.push("Spice preferences differ".to_string());
    }
    if price_diff > DIFFERENCE_THRESHOLD {
        differences.push("Budget preferences differ".to_string());
    }

    Compatibility {
        score: (score * 100.0).round() / 100.0,
        common_cuisines: common,
        merged,
        differences,
    }
}

/// Cuisines only one partner listed, at most three
pub fn compromise_cuisines(a: &TasteProfile, b: &TasteProfile, common: &[String]) -> Vec<String> {
    all_cuisines(a, b)
        .into_iter()
        .filter(|c| !common.contains(c))
        .take(3)
        .collect()
}

pub fn analysis(score: f64) -> &'static str {
    if score >= 0.8 {
        "Excellent match! You both have very similar taste preferences."
    } else if score >= 0.6 {
        "Good compatibility! You share several common preferences."
    } else {
        "Some differences in taste, but that makes for interesting dining adventures!"
    }
}

/// One partner's appetite for a restaurant, in `[0.5, 1.0]`
pub fn score_for_user(restaurant: &Restaurant, profile: &TasteProfile) -> f64 {
    let mut score = 0.5;
    score += (1.0 - (profile.price_sensitivity - (1.0 - restaurant.price_level())).abs()) * 0.3;
    score += (restaurant.rating_or(3.5) / 5.0) * 0.2;

    let hit = restaurant.category_aliases().iter().any(|alias| {
        profile
            .preferred_cuisines
            .iter()
            .any(|p| p.to_lowercase() == *alias)
    });
    if hit {
        score += 0.3;
    }

    score.min(1.0)
}

pub fn explain_date_match(restaurant: &Restaurant, common_cuisines: &[String]) -> String {
    let mut reasons = Vec::new();

    if let Some(rating) = restaurant.rating.filter(|r| *r >= 4.0) {
        reasons.push(format!("Highly rated ({:.1}★)", rating));
    }

    let titles: Vec<String> = restaurant.category_titles().iter().map(|t| t.to_lowercase()).collect();
    if common_cuisines.iter().any(|c| titles.contains(&c.to_lowercase())) {
        reasons.push("Matches your shared cuisine tastes".to_string());
    }

    reasons.push(format!("Price point ({}) works for both", restaurant.price_or_default()));
    reasons.join(" • ")
}

#[derive(Debug, Clone, Serialize)]
pub struct DateSuggestion {
    pub restaurant: Restaurant,
    pub combined_score: f64,
    pub user1_score: f64,
    pub user2_score: f64,
    pub why_it_works: String,
    pub from_ai: bool,
}

/// Suggestions split by who is likely to enjoy them
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuggestionBuckets {
    pub perfect_matches: Vec<Restaurant>,
    pub you_will_love: Vec<Restaurant>,
    pub they_will_love: Vec<Restaurant>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Merge AI picks with search results and score each for both partners.
///
/// AI picks come first and win duplicate ids. At most `limit * 3`
/// candidates are scored. The result is sorted with AI picks ahead, then by
/// combined score.
pub fn score_suggestions(
    ai_picks: Vec<Restaurant>,
    searched: Vec<Restaurant>,
    user: &TasteProfile,
    partner: &TasteProfile,
    common_cuisines: &[String],
    limit: usize,
) -> Vec<DateSuggestion> {
    let ai_ids: HashSet<String> = ai_picks.iter().map(|r| r.id.clone()).collect();
    let mut seen = HashSet::new();

    let mut suggestions: Vec<DateSuggestion> = ai_picks
        .into_iter()
        .chain(searched)
        .filter(|r| !r.id.is_empty() && seen.insert(r.id.clone()))
        .take(limit * 3)
        .map(|restaurant| {
            let s1 = score_for_user(&restaurant, user);
            let s2 = score_for_user(&restaurant, partner);
            let combined = (s1 + s2) / 2.0 * s1.min(s2);
            DateSuggestion {
                from_ai: ai_ids.contains(&restaurant.id),
                why_it_works: explain_date_match(&restaurant, common_cuisines),
                combined_score: round2(combined),
                user1_score: round2(s1),
                user2_score: round2(s2),
                restaurant,
            }
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.from_ai.cmp(&a.from_ai).then(
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
    suggestions
}

/// Bucket scored suggestions, at most `limit` per bucket
pub fn categorize(suggestions: Vec<DateSuggestion>, limit: usize) -> SuggestionBuckets {
    let mut buckets = SuggestionBuckets::default();

    for s in suggestions {
        let bucket = if s.user1_score >= BOTH_LOVE_THRESHOLD && s.user2_score >= BOTH_LOVE_THRESHOLD {
            &mut buckets.perfect_matches
        } else if s.user1_score > s.user2_score + PREFERENCE_MARGIN {
            &mut buckets.you_will_love
        } else if s.user2_score > s.user1_score + PREFERENCE_MARGIN {
            &mut buckets.they_will_love
        } else {
            &mut buckets.perfect_matches
        };

        if bucket.len() < limit {
            bucket.push(s.restaurant);
        }
    }

    buckets
}
