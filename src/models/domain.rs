use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub embedding_vector_id: Option<String>,
    pub quiz_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Quiz-derived preference profile, without storage identity.
///
/// All four scores live in `[0.0, 1.0]`. `price_sensitivity` runs from
/// 0 (fine dining) to 1 (budget-friendly).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteProfile {
    pub adventure_score: f64,
    pub spice_tolerance: f64,
    pub price_sensitivity: f64,
    pub cuisine_diversity: f64,
    pub ambiance_preference: Option<String>,
    #[serde(default)]
    pub preferred_cuisines: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

impl Default for TasteProfile {
    fn default() -> Self {
        Self {
            adventure_score: 0.5,
            spice_tolerance: 0.5,
            price_sensitivity: 0.5,
            cuisine_diversity: 0.5,
            ambiance_preference: Some("casual".to_string()),
            preferred_cuisines: Vec::new(),
            dietary_restrictions: Vec::new(),
        }
    }
}

/// Stored TasteDNA row, one per user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TasteDna {
    pub id: Uuid,
    pub user_id: Uuid,
    pub adventure_score: f64,
    pub spice_tolerance: f64,
    pub price_sensitivity: f64,
    pub cuisine_diversity: f64,
    pub ambiance_preference: Option<String>,
    #[sqlx(json)]
    pub preferred_cuisines: Vec<String>,
    #[sqlx(json)]
    pub dietary_restrictions: Vec<String>,
    #[serde(skip_serializing)]
    pub quiz_answers: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TasteDna {
    pub fn profile(&self) -> TasteProfile {
        TasteProfile {
            adventure_score: self.adventure_score,
            spice_tolerance: self.spice_tolerance,
            price_sensitivity: self.price_sensitivity,
            cuisine_diversity: self.cuisine_diversity,
            ambiance_preference: self.ambiance_preference.clone(),
            preferred_cuisines: self.preferred_cuisines.clone(),
            dietary_restrictions: self.dietary_restrictions.clone(),
        }
    }
}

/// Directed edge in the twin graph; mirrors the last kNN result for `user_id`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TwinRelationship {
    pub id: Uuid,
    pub user_id: Uuid,
    pub twin_user_id: Uuid,
    pub similarity_score: f64,
    #[sqlx(json)]
    pub common_cuisines: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Twin enriched with the twin's account and taste data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinMatch {
    pub twin_id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub similarity_score: f64,
    pub shared_cuisines: Vec<String>,
    pub adventure_score: f64,
    pub spice_tolerance: f64,
}

/// Kinds of restaurant interactions a user can log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    View,
    Save,
    Book,
    Dismiss,
    Like,
    Visited,
}

impl ActionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "view" => Some(Self::View),
            "save" => Some(Self::Save),
            "book" => Some(Self::Book),
            "dismiss" => Some(Self::Dismiss),
            "like" => Some(Self::Like),
            "visited" => Some(Self::Visited),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Save => "save",
            Self::Book => "book",
            Self::Dismiss => "dismiss",
            Self::Like => "like",
            Self::Visited => "visited",
        }
    }

    /// Interactions that count as an endorsement of the restaurant
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Save | Self::Book | Self::Like)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InteractionLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: String,
    pub action_type: String,
    pub context: Option<String>,
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SavedRestaurant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: String,
    pub restaurant_name: Option<String>,
    pub restaurant_data: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub challenge_type: String,
    pub target_count: i32,
    pub points_reward: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserChallenge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub challenge_id: Uuid,
    pub progress: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserAchievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_type: String,
    pub achievement_data: Option<serde_json::Value>,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DateNightPairing {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub compatibility_score: Option<f64>,
    pub merged_preferences: Option<serde_json::Value>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ImageSearch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: Option<String>,
    pub detected_dish: String,
    pub detected_cuisine: String,
    pub confidence_score: f64,
    pub results: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Yelp business category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub title: String,
}

/// Yelp business as returned by the Fusion API.
///
/// Only the fields the scoring code reads are typed; everything else is kept
/// in `extra` so proxied payloads reach the client unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Restaurant {
    pub fn price_or_default(&self) -> &str {
        self.price.as_deref().unwrap_or("$$")
    }

    /// Price tier as a fraction: `$` = 0.25 up to `$$$$` = 1.0
    pub fn price_level(&self) -> f64 {
        self.price_or_default().chars().count() as f64 / 4.0
    }

    pub fn rating_or(&self, default: f64) -> f64 {
        self.rating.unwrap_or(default)
    }

    pub fn category_aliases(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.alias.as_str()).collect()
    }

    pub fn category_titles(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.title.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_parse() {
        assert_eq!(ActionType::parse("SAVE"), Some(ActionType::Save));
        assert_eq!(ActionType::parse("visited"), Some(ActionType::Visited));
        assert_eq!(ActionType::parse("share"), None);
        assert!(ActionType::Like.is_positive());
        assert!(!ActionType::Dismiss.is_positive());
    }

    #[test]
    fn test_restaurant_keeps_unknown_fields() {
        let json = serde_json::json!({
            "id": "abc",
            "name": "Nopa",
            "rating": 4.5,
            "price": "$$$",
            "categories": [{"alias": "newamerican", "title": "New American"}],
            "url": "https://yelp.com/biz/nopa",
        });

        let restaurant: Restaurant = serde_json::from_value(json).unwrap();
        assert_eq!(restaurant.price_level(), 0.75);
        assert_eq!(restaurant.category_aliases(), vec!["newamerican"]);
        assert_eq!(restaurant.extra["url"], "https://yelp.com/biz/nopa");

        let back = serde_json::to_value(&restaurant).unwrap();
        assert_eq!(back["url"], "https://yelp.com/biz/nopa");
    }

    #[test]
    fn test_restaurant_price_defaults() {
        let restaurant: Restaurant = serde_json::from_value(serde_json::json!({"id": "x"})).unwrap();
        assert_eq!(restaurant.price_or_default(), "$$");
        assert_eq!(restaurant.price_level(), 0.5);
        assert_eq!(restaurant.rating_or(3.5), 3.5);
    }
}
