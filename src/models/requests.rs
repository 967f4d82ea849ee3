use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request to register a new account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 8, max = 100))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub avatar_url: Option<String>,
}

/// One answered quiz question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question_id: String,
    /// swipe_right, swipe_left, slider_value, choice
    #[serde(default)]
    pub answer_type: String,
    pub value: Option<f64>,
    pub choice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub answers: Vec<QuizAnswer>,
}

/// Query parameters for the Yelp search proxy
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RestaurantSearchQuery {
    pub term: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(range(max = 40000))]
    pub radius: Option<u32>,
    pub categories: Option<String>,
    pub price: Option<String>,
    #[serde(default)]
    pub open_now: bool,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_search_limit")]
    #[validate(range(min = 1, max = 50))]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_sort_by() -> String {
    "best_match".to_string()
}

fn default_search_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewsQuery {
    #[serde(default = "default_review_limit")]
    #[validate(range(min = 1, max = 10))]
    pub limit: u32,
}

fn default_review_limit() -> u32 {
    3
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveRestaurantRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogInteractionRequest {
    /// view, save, book, dismiss, like, visited
    pub action_type: String,
    /// lucky, compare, search, twins, date_night
    pub context: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AutocompleteQuery {
    #[validate(length(min = 1, max = 100))]
    pub text: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationQuery {
    #[validate(length(min = 1))]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrendingQuery {
    #[validate(length(min = 1))]
    pub location: String,
    #[serde(default = "default_trending_limit")]
    #[validate(range(min = 1, max = 20))]
    pub limit: usize,
}

fn default_trending_limit() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub restaurant_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRequest {
    pub partner_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerQuery {
    pub partner_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SuggestionsQuery {
    pub partner_id: Uuid,
    #[validate(length(min = 1))]
    pub location: String,
    #[serde(default = "default_suggestions_limit")]
    #[validate(range(min = 1, max = 10))]
    pub limit: usize,
}

fn default_suggestions_limit() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProgressQuery {
    #[serde(default = "default_increment")]
    #[validate(range(min = 1))]
    pub increment: i32,
}

fn default_increment() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LeaderboardQuery {
    #[serde(default = "default_board")]
    pub board_type: String,
    #[serde(default = "default_leaderboard_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: isize,
}

fn default_board() -> String {
    "adventure".to_string()
}

fn default_leaderboard_limit() -> isize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareCardRequest {
    #[serde(default = "default_true")]
    pub include_twins: bool,
    #[serde(default = "default_true")]
    pub include_top_cuisines: bool,
    /// default, minimal, colorful
    #[serde(default = "default_style")]
    pub style: String,
}

fn default_true() -> bool {
    true
}

fn default_style() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ImageUploadQuery {
    #[validate(length(min = 1))]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    #[validate(range(min = 1, max = 50))]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 1000))]
    pub query: String,
    pub chat_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default = "default_true")]
    pub use_taste_dna: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AiCompareRequest {
    #[validate(length(min = 1, max = 3))]
    pub restaurant_ids: Vec<String>,
    #[serde(default = "default_criteria")]
    pub criteria: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn default_criteria() -> String {
    "overall experience".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[validate(length(min = 1))]
    pub occasion: String,
    #[validate(range(min = 1, max = 20))]
    pub party_size: Option<u32>,
    pub date_time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RestaurantQuestionRequest {
    #[validate(length(min = 1))]
    pub restaurant_id: String,
    #[validate(length(min = 1, max = 500))]
    pub question: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SmartSearchQuery {
    #[validate(length(min = 1, max = 1000))]
    pub query: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let ok = RegisterRequest {
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            password: "longenough".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = RegisterRequest { password: "short".to_string(), ..ok.clone() };
        assert!(short.validate().is_err());

        let bad_email = RegisterRequest { email: "not-an-email".to_string(), ..ok };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_search_query_defaults() {
        let query: RestaurantSearchQuery =
            serde_json::from_value(serde_json::json!({"location": "SF"})).unwrap();
        assert_eq!(query.sort_by, "best_match");
        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 0);
        assert!(!query.open_now);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_share_card_defaults() {
        let req: ShareCardRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.include_twins);
        assert!(req.include_top_cuisines);
        assert_eq!(req.style, "default");
    }
}
