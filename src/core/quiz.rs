use serde::Serialize;
use std::collections::HashMap;

use crate::models::{ActionType, QuizAnswer, Restaurant, TasteProfile};

/// Learning rate for interaction-driven profile updates
pub const INTERACTION_LEARNING_RATE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Swipe,
    Slider,
    Choice,
    Multiselect,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Question as served to the client
#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestion {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuizOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_label: Option<&'static str>,
    /// Adventure contribution of a right swipe
    #[serde(skip)]
    pub adventure_trait: Option<f64>,
}

const SWIPE_OPTIONS: [(&str, &str); 2] = [("left", "Pass"), ("right", "Yes!")];

fn options(pairs: &[(&'static str, &'static str)]) -> Option<Vec<QuizOption>> {
    Some(pairs.iter().map(|(value, label)| QuizOption { value, label }).collect())
}

fn swipe(id: &'static str, question: &'static str, image_url: &'static str, adventure: Option<f64>) -> QuizQuestion {
    QuizQuestion {
        id,
        kind: QuestionKind::Swipe,
        question,
        options: options(&SWIPE_OPTIONS),
        image_url: Some(image_url),
        min_value: None,
        max_value: None,
        min_label: None,
        max_label: None,
        adventure_trait: adventure,
    }
}

fn slider(id: &'static str, question: &'static str, min_label: &'static str, max_label: &'static str) -> QuizQuestion {
    QuizQuestion {
        id,
        kind: QuestionKind::Slider,
        question,
        options: None,
        image_url: None,
        min_value: Some(0.0),
        max_value: Some(1.0),
        min_label: Some(min_label),
        max_label: Some(max_label),
        adventure_trait: None,
    }
}

fn choice(id: &'static str, kind: QuestionKind, question: &'static str, pairs: &[(&'static str, &'static str)]) -> QuizQuestion {
    QuizQuestion {
        id,
        kind,
        question,
        options: options(pairs),
        image_url: None,
        min_value: None,
        max_value: None,
        min_label: None,
        max_label: None,
        adventure_trait: None,
    }
}

/// The full TasteDNA quiz, in presentation order
pub fn quiz_questions() -> Vec<QuizQuestion> {
    vec![
        swipe(
            "swipe_1",
            "Would you try this trendy urban restaurant?",
            "https://images.unsplash.com/photo-1517248135467-4c7edcad34c4?w=800&h=600&fit=crop",
            Some(0.7),
        ),
        swipe(
            "swipe_2",
            "Would you try this exotic cuisine spot?",
            "https://images.unsplash.com/photo-1559314809-0d155014e29e?w=800&h=600&fit=crop",
            Some(0.9),
        ),
        swipe(
            "swipe_3",
            "Would you try this upscale fine dining venue?",
            "https://images.unsplash.com/photo-1552566626-52f8b828add9?w=800&h=600&fit=crop",
            None,
        ),
        swipe(
            "swipe_4",
            "Would you try this spicy Thai restaurant?",
            "https://images.unsplash.com/photo-1562565652-a0d8f0c59eb4?w=800&h=600&fit=crop",
            None,
        ),
        swipe(
            "swipe_5",
            "Would you try this casual family diner?",
            "https://images.unsplash.com/photo-1414235077428-338989a2e8c0?w=800&h=600&fit=crop",
            Some(0.3),
        ),
        slider("spice_tolerance", "How spicy do you like your food?", "Mild", "Fire!"),
        slider(
            "adventure_level",
            "How adventurous are you with trying new foods?",
            "Stick to favorites",
            "Always exploring",
        ),
        slider("price_range", "What's your typical dining budget?", "Fine dining", "Budget-friendly"),
        choice(
            "ambiance_pref",
            QuestionKind::Choice,
            "What's your ideal restaurant vibe?",
            &[
                ("casual", "Casual & Relaxed"),
                ("upscale", "Upscale & Elegant"),
                ("cozy", "Cozy & Intimate"),
                ("trendy", "Trendy & Hip"),
                ("lively", "Lively & Social"),
            ],
        ),
        slider("cuisine_variety", "Do you prefer variety or consistency?", "Same favorites", "Always different"),
        choice(
            "preferred_cuisines",
            QuestionKind::Multiselect,
            "Select your favorite cuisines (pick 3-5)",
            &[
                ("italian", "Italian"),
                ("japanese", "Japanese"),
                ("mexican", "Mexican"),
                ("chinese", "Chinese"),
                ("indian", "Indian"),
                ("thai", "Thai"),
                ("french", "French"),
                ("mediterranean", "Mediterranean"),
                ("korean", "Korean"),
                ("vietnamese", "Vietnamese"),
                ("american", "American"),
                ("middle_eastern", "Middle Eastern"),
            ],
        ),
        choice(
            "dietary_restrictions",
            QuestionKind::Multiselect,
            "Any dietary restrictions?",
            &[
                ("none", "None"),
                ("vegetarian", "Vegetarian"),
                ("vegan", "Vegan"),
                ("gluten_free", "Gluten-Free"),
                ("dairy_free", "Dairy-Free"),
                ("halal", "Halal"),
                ("kosher", "Kosher"),
            ],
        ),
    ]
}

#[inline]
fn round2(value: f64) -> f64 {
    (value.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Aggregate quiz answers into a taste profile.
///
/// Unanswered questions keep their neutral default (0.5, casual, empty
/// lists). Answers to unknown question ids are ignored.
pub fn calculate_taste_dna(answers: &[QuizAnswer]) -> TasteProfile {
    let by_id: HashMap<&str, &QuizAnswer> =
        answers.iter().map(|a| (a.question_id.as_str(), a)).collect();

    let mut adventure_scores: Vec<f64> = Vec::new();
    let mut profile = TasteProfile::default();

    for question in quiz_questions() {
        let Some(answer) = by_id.get(question.id) else {
            continue;
        };
        let slider_value = answer.value.unwrap_or(0.5);

        match (question.kind, question.id) {
            (QuestionKind::Swipe, _) => {
                if answer.choice.as_deref() == Some("right") {
                    if let Some(adventure) = question.adventure_trait {
                        adventure_scores.push(adventure);
                    }
                }
            }
            (QuestionKind::Slider, "spice_tolerance") => profile.spice_tolerance = slider_value,
            (QuestionKind::Slider, "adventure_level") => adventure_scores.push(slider_value),
            (QuestionKind::Slider, "price_range") => profile.price_sensitivity = slider_value,
            (QuestionKind::Slider, "cuisine_variety") => profile.cuisine_diversity = slider_value,
            (QuestionKind::Choice, "ambiance_pref") => {
                let ambiance = answer.choice.clone().filter(|c| !c.is_empty());
                profile.ambiance_preference = Some(ambiance.unwrap_or_else(|| "casual".to_string()));
            }
            (QuestionKind::Multiselect, "preferred_cuisines") => {
                if let Some(choice) = &answer.choice {
                    profile.preferred_cuisines = split_list(choice);
                }
            }
            (QuestionKind::Multiselect, "dietary_restrictions") => {
                if let Some(choice) = &answer.choice {
                    profile.dietary_restrictions =
                        split_list(choice).into_iter().filter(|r| r != "none").collect();
                }
            }
            _ => {}
        }
    }

    if !adventure_scores.is_empty() {
        profile.adventure_score = adventure_scores.iter().sum::<f64>() / adventure_scores.len() as f64;
    }

    profile.adventure_score = round2(profile.adventure_score);
    profile.spice_tolerance = round2(profile.spice_tolerance);
    profile.price_sensitivity = round2(profile.price_sensitivity);
    profile.cuisine_diversity = round2(profile.cuisine_diversity);

    profile
}

/// Nudge a profile toward a restaurant the user engaged with.
///
/// Returns true when the profile changed. Only positive interactions
/// (save, book, like) move the profile.
pub fn apply_interaction(profile: &mut TasteProfile, action: ActionType, restaurant: &Restaurant) -> bool {
    if !action.is_positive() {
        return false;
    }

    let lr = INTERACTION_LEARNING_RATE;
    let target = 1.0 - restaurant.price_level();
    profile.price_sensitivity =
        (profile.price_sensitivity + lr * (target - profile.price_sensitivity)).clamp(0.0, 1.0);

    let is_new_cuisine = restaurant
        .category_aliases()
        .into_iter()
        .any(|alias| !profile.preferred_cuisines.iter().any(|c| c == alias));
    if is_new_cuisine {
        profile.cuisine_diversity = (profile.cuisine_diversity + lr).min(1.0);
    }

    true
}
