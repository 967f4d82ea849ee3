use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::discovery::{MatchFactor, TastePrediction};
use crate::core::quiz::QuizQuestion;
use crate::models::domain::{Challenge, Restaurant, TasteDna, TwinMatch, User};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: bool,
    pub cache: bool,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ----- auth & users -----

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub quiz_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            quiz_completed: user.quiz_completed,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithToken {
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: String,
}

impl UserWithToken {
    pub fn bearer(user: &User, access_token: String) -> Self {
        Self {
            user: user.into(),
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

// ----- taste dna -----

#[derive(Debug, Clone, Serialize)]
pub struct QuizResponse {
    pub total_questions: usize,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TasteDnaCalculationResult {
    pub taste_dna: TasteDna,
    pub twin_count: usize,
    pub top_twin_similarity: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TasteDnaCard {
    pub user_name: String,
    pub adventure_score: f64,
    pub spice_tolerance: f64,
    pub price_sensitivity: f64,
    pub cuisine_diversity: f64,
    pub ambiance_preference: Option<String>,
    pub top_cuisines: Vec<String>,
    pub twin_count: i64,
}

// ----- twins -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwinsListResponse {
    pub total_count: usize,
    pub twins: Vec<TwinMatch>,
}

impl From<Vec<TwinMatch>> for TwinsListResponse {
    fn from(twins: Vec<TwinMatch>) -> Self {
        Self {
            total_count: twins.len(),
            twins,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwinCountResponse {
    pub count: i64,
}

// ----- discovery -----

/// A restaurant annotated with why it fits the caller
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantWithExplanation {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub explanation: String,
    pub match_score: f64,
    pub twin_endorsements: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeelingLuckyResponse {
    pub restaurant: RestaurantWithExplanation,
    pub twin_count: usize,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareOption {
    pub restaurant: Restaurant,
    pub match_score: f64,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareResponse {
    pub options: Vec<CompareOption>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingItem {
    pub restaurant: Restaurant,
    pub twin_visits: usize,
    pub trend_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingResponse {
    pub items: Vec<TrendingItem>,
    pub time_period: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainResponse {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub explanation: String,
    pub match_factors: Vec<MatchFactor>,
    pub twin_insights: Option<String>,
}

pub type PredictionResponse = TastePrediction;

// ----- restaurants -----

#[derive(Debug, Clone, Serialize)]
pub struct SavedRestaurantResponse {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub restaurant_data: Restaurant,
    pub notes: Option<String>,
    pub saved_at: DateTime<Utc>,
}

// ----- date night -----

#[derive(Debug, Clone, Serialize)]
pub struct PairResponse {
    pub message: String,
    pub compatibility_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityResponse {
    pub compatibility_score: f64,
    pub shared_cuisines: Vec<String>,
    pub compromise_cuisines: Vec<String>,
    pub differences: Vec<String>,
    pub analysis: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateNightSuggestionsResponse {
    pub perfect_matches: Vec<Restaurant>,
    pub you_will_love: Vec<Restaurant>,
    pub they_will_love: Vec<Restaurant>,
    pub ai_insight: String,
}

// ----- gamification -----

#[derive(Debug, Clone, Serialize)]
pub struct ChallengeProgress {
    pub challenge: Challenge,
    pub progress: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChallengeListResponse {
    pub active_challenges: Vec<ChallengeProgress>,
    pub completed_challenges: Vec<ChallengeProgress>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub progress: i32,
    pub completed: bool,
    pub target: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: Uuid,
    pub user_name: String,
    pub avatar_url: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    pub board_type: String,
    pub entries: Vec<LeaderboardEntry>,
    pub user_rank: Option<i64>,
    pub user_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementResponse {
    pub id: Uuid,
    pub achievement_type: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<AchievementResponse>,
    pub total_points: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareCardResponse {
    pub card_url: Option<String>,
    pub card_data: Value,
    pub share_text: String,
}

// ----- image search -----

#[derive(Debug, Clone, Serialize)]
pub struct ImageMatch {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub match_reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSearchResponse {
    pub id: Uuid,
    pub detected_dish: String,
    pub detected_cuisine: String,
    pub confidence: f64,
    pub restaurants: Vec<ImageMatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSearchDetail {
    pub id: Uuid,
    pub detected_dish: String,
    pub detected_cuisine: String,
    pub confidence: f64,
    pub results: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSearchSummary {
    pub id: Uuid,
    pub detected_dish: String,
    pub detected_cuisine: String,
    pub confidence: f64,
    pub result_count: usize,
    pub created_at: DateTime<Utc>,
}
