use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::core::compatibility::compatibility;
use crate::models::TasteProfile;
use crate::services::yelp::YelpError;

/// Yelp AI rejects queries longer than this
pub const MAX_QUERY_CHARS: usize = 1000;

/// Flattened Yelp AI chat reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiChatResponse {
    pub chat_id: Option<String>,
    pub text: String,
    pub tags: Vec<Value>,
    pub types: Vec<Value>,
    pub entities: Vec<Value>,
    /// Businesses of the first entity, if any
    pub businesses: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawReply {
    #[serde(default)]
    text: String,
    #[serde(default)]
    tags: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawChatResponse {
    chat_id: Option<String>,
    #[serde(default)]
    response: RawReply,
    #[serde(default)]
    types: Vec<Value>,
    #[serde(default)]
    entities: Vec<Value>,
}

impl From<RawChatResponse> for AiChatResponse {
    fn from(raw: RawChatResponse) -> Self {
        let businesses = raw
            .entities
            .first()
            .and_then(|e| e.get("businesses"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Self {
            chat_id: raw.chat_id,
            text: raw.response.text,
            tags: raw.response.tags,
            types: raw.types,
            entities: raw.entities,
            businesses,
        }
    }
}

/// Options for a single chat turn
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub chat_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skip_text_generation: bool,
}

impl ChatOptions {
    pub fn located(latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            ..Self::default()
        }
    }
}

/// Yelp AI conversational search client
pub struct YelpAiClient {
    chat_url: String,
    api_key: String,
    client: Client,
}

impl YelpAiClient {
    pub fn new(chat_url: String, api_key: String, timeout: Duration) -> Result<Self, YelpError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            chat_url,
            api_key,
            client,
        })
    }

    pub async fn chat(&self, query: &str, options: ChatOptions) -> Result<AiChatResponse, YelpError> {
        let payload = chat_payload(query, &options);

        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Yelp AI returned {}: {}", status, body);
            return Err(YelpError::ApiError { status: status.as_u16() });
        }

        let raw: RawChatResponse = response
            .json()
            .await
            .map_err(|e| YelpError::InvalidResponse(e.to_string()))?;

        Ok(raw.into())
    }

    /// Chat with the query enriched by the user's taste profile
    pub async fn search_with_context(
        &self,
        query: &str,
        profile: Option<&TasteProfile>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<AiChatResponse, YelpError> {
        let query = match profile {
            Some(p) => enhance_query(query, p),
            None => query.to_string(),
        };
        self.chat(&query, ChatOptions::located(latitude, longitude)).await
    }

    pub async fn compare_restaurants(
        &self,
        restaurant_ids: &[String],
        criteria: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<AiChatResponse, YelpError> {
        self.chat(
            &compare_prompt(restaurant_ids, criteria),
            ChatOptions::located(latitude, longitude),
        )
        .await
    }

    pub async fn recommend_for_occasion(
        &self,
        occasion: &str,
        party_size: Option<u32>,
        date_time: Option<&str>,
        profile: Option<&TasteProfile>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<AiChatResponse, YelpError> {
        let query = occasion_prompt(occasion, party_size, date_time);
        self.search_with_context(&query, profile, latitude, longitude).await
    }

    pub async fn ask_about_restaurant(
        &self,
        restaurant_id: &str,
        question: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<AiChatResponse, YelpError> {
        let query = format!("Tell me about the restaurant with ID {}: {}", restaurant_id, question);
        self.chat(&query, ChatOptions::located(latitude, longitude)).await
    }

    pub async fn date_night_recommendations(
        &self,
        user: &TasteProfile,
        partner: &TasteProfile,
        location: &str,
    ) -> Result<AiChatResponse, YelpError> {
        self.chat(&date_night_prompt(user, partner, location), ChatOptions::default())
            .await
    }
}

fn chat_payload(query: &str, options: &ChatOptions) -> Value {
    let mut payload = Map::new();
    let capped: String = query.chars().take(MAX_QUERY_CHARS).collect();
    payload.insert("query".into(), json!(capped));

    if let Some(chat_id) = &options.chat_id {
        payload.insert("chat_id".into(), json!(chat_id));
    }
    if let (Some(lat), Some(lon)) = (options.latitude, options.longitude) {
        payload.insert("user_context".into(), json!({ "latitude": lat, "longitude": lon }));
    }
    if options.skip_text_generation {
        payload.insert("request_context".into(), json!({ "skip_text_generation": true }));
    }

    Value::Object(payload)
}

/// Append the user's preferences to a free-text query
pub fn enhance_query(query: &str, profile: &TasteProfile) -> String {
    let mut preferences = Vec::new();

    if !profile.preferred_cuisines.is_empty() {
        let top: Vec<&str> = profile.preferred_cuisines.iter().take(3).map(String::as_str).collect();
        preferences.push(format!("I prefer {} cuisine", top.join(", ")));
    }

    if profile.price_sensitivity > 0.7 {
        preferences.push("budget-friendly options".to_string());
    } else if profile.price_sensitivity < 0.3 {
        preferences.push("upscale dining".to_string());
    }

    if let Some(ambiance) = profile.ambiance_preference.as_deref().filter(|a| !a.is_empty()) {
        preferences.push(format!("{} atmosphere", ambiance));
    }

    if profile.adventure_score > 0.7 {
        preferences.push("unique and adventurous places".to_string());
    } else if profile.adventure_score < 0.3 {
        preferences.push("classic and reliable spots".to_string());
    }

    if preferences.is_empty() {
        return query.to_string();
    }
    format!("{}. My preferences: {}.", query, preferences.join(", "))
}

pub fn compare_prompt(restaurant_ids: &[String], criteria: &str) -> String {
    let ids: Vec<&str> = restaurant_ids.iter().take(3).map(String::as_str).collect();
    format!(
        "Compare these restaurants for {}: {}. Give me pros and cons for each.",
        criteria,
        ids.join(" and ")
    )
}

pub fn occasion_prompt(occasion: &str, party_size: Option<u32>, date_time: Option<&str>) -> String {
    let mut parts = vec![format!("Recommend restaurants for a {}", occasion)];
    if let Some(size) = party_size {
        parts.push(format!("for {} people", size));
    }
    if let Some(when) = date_time.filter(|d| !d.is_empty()) {
        parts.push(format!("on {}", when));
    }
    parts.join(" ")
}

/// Prompt describing what both partners enjoy
pub fn date_night_prompt(user: &TasteProfile, partner: &TasteProfile, location: &str) -> String {
    let mut parts = vec![format!(
        "Recommend restaurants in {} for a romantic date night",
        location
    )];

    let common = compatibility(user, partner).common_cuisines;
    if !common.is_empty() {
        parts.push(format!("We both love {} food", common.iter().take(3).cloned().collect::<Vec<_>>().join(", ")));
    } else {
        let mut all: Vec<String> = user.preferred_cuisines.clone();
        for c in &partner.preferred_cuisines {
            if !all.contains(c) {
                all.push(c.clone());
            }
        }
        if !all.is_empty() {
            parts.push(format!("We enjoy {} cuisine", all.into_iter().take(4).collect::<Vec<_>>().join(", ")));
        }
    }

    let avg_price = (user.price_sensitivity + partner.price_sensitivity) / 2.0;
    if avg_price > 0.7 {
        parts.push("with reasonable prices".to_string());
    } else if avg_price < 0.3 {
        parts.push("upscale and special occasion worthy".to_string());
    }

    let a1 = user.ambiance_preference.as_deref().unwrap_or_default().to_lowercase();
    let a2 = partner.ambiance_preference.as_deref().unwrap_or_default().to_lowercase();
    if !a1.is_empty() && a1 == a2 {
        parts.push(format!("with a {} atmosphere", a1));
    } else {
        parts.push("with a romantic and intimate atmosphere".to_string());
    }

    let avg_adventure = (user.adventure_score + partner.adventure_score) / 2.0;
    if avg_adventure > 0.7 {
        parts.push("unique and adventurous spots preferred".to_string());
    } else if avg_adventure < 0.3 {
        parts.push("classic and well-established restaurants".to_string());
    }

    parts.push("Please suggest places that would work well for both of us".to_string());
    format!("{}.", parts.join(". "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn profile(adventure: f64, price: f64, ambiance: Option<&str>, cuisines: &[&str]) -> TasteProfile {
        TasteProfile {
            adventure_score: adventure,
            price_sensitivity: price,
            ambiance_preference: ambiance.map(str::to_string),
            preferred_cuisines: cuisines.iter().map(|c| c.to_string()).collect(),
            ..TasteProfile::default()
        }
    }

    #[test]
    fn test_enhance_query() {
        let p = profile(0.9, 0.8, Some("cozy"), &["thai", "korean", "greek", "french"]);
        assert_eq!(
            enhance_query("Dinner tonight", &p),
            "Dinner tonight. My preferences: I prefer thai, korean, greek cuisine, \
             budget-friendly options, cozy atmosphere, unique and adventurous places."
        );
    }

    #[test]
    fn test_enhance_query_without_preferences() {
        let p = profile(0.5, 0.5, None, &[]);
        assert_eq!(enhance_query("Lunch", &p), "Lunch");
    }

    #[test]
    fn test_compare_and_occasion_prompts() {
        let ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            compare_prompt(&ids, "price"),
            "Compare these restaurants for price: a and b. Give me pros and cons for each."
        );
        assert_eq!(
            occasion_prompt("birthday", Some(6), Some("Friday")),
            "Recommend restaurants for a birthday for 6 people on Friday"
        );
        assert_eq!(occasion_prompt("brunch", None, None), "Recommend restaurants for a brunch");
    }

    #[test]
    fn test_date_night_prompt() {
        let a = profile(0.9, 0.9, Some("Cozy"), &["thai", "korean"]);
        let b = profile(0.8, 0.8, Some("cozy"), &["thai"]);
        assert_eq!(
            date_night_prompt(&a, &b, "Oakland"),
            "Recommend restaurants in Oakland for a romantic date night. We both love thai food. \
             with reasonable prices. with a cozy atmosphere. unique and adventurous spots preferred. \
             Please suggest places that would work well for both of us."
        );
    }

    #[test]
    fn test_payload_caps_query_and_adds_context() {
        let long = "x".repeat(1500);
        let payload = chat_payload(
            &long,
            &ChatOptions {
                chat_id: Some("c1".into()),
                latitude: Some(1.0),
                longitude: Some(2.0),
                skip_text_generation: true,
            },
        );
        assert_eq!(payload["query"].as_str().unwrap().len(), 1000);
        assert_eq!(payload["chat_id"], "c1");
        assert_eq!(payload["user_context"]["longitude"], 2.0);
        assert_eq!(payload["request_context"]["skip_text_generation"], true);

        let bare = chat_payload("hi", &ChatOptions::located(Some(1.0), None));
        assert!(bare.get("user_context").is_none());
    }

    #[tokio::test]
    async fn test_chat_flattens_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ai/chat/v2")
            .match_header("authorization", "Bearer ai-key")
            .match_body(Matcher::PartialJson(json!({"query": "tacos"})))
            .with_status(200)
            .with_body(
                json!({
                    "chat_id": "chat-9",
                    "response": {"text": "Try these", "tags": []},
                    "types": ["business_search"],
                    "entities": [{"businesses": [{"id": "t1", "name": "Taqueria"}]}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = YelpAiClient::new(
            format!("{}/ai/chat/v2", server.url()),
            "ai-key".into(),
            Duration::from_secs(5),
        )
        .unwrap();

        let reply = client.chat("tacos", ChatOptions::default()).await.unwrap();
        mock.assert_async().await;

        assert_eq!(reply.chat_id.as_deref(), Some("chat-9"));
        assert_eq!(reply.text, "Try these");
        assert_eq!(reply.businesses.len(), 1);
        assert_eq!(reply.businesses[0]["id"], "t1");
    }

    #[tokio::test]
    async fn test_chat_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(429)
            .create_async()
            .await;

        let client = YelpAiClient::new(format!("{}/chat", server.url()), "k".into(), Duration::from_secs(5)).unwrap();
        let err = client.chat("x", ChatOptions::default()).await.unwrap_err();
        assert!(matches!(err, YelpError::ApiError { status: 429 }));
    }
}
