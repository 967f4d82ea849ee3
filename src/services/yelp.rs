use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::discovery::price_filter_for;
use crate::models::{Restaurant, RestaurantSearchQuery, TasteProfile};
use crate::services::cache::{CacheKey, CacheManager};

/// Yelp caps search radius at 40 km
pub const MAX_RADIUS_METERS: u32 = 40_000;

/// Errors that can occur when calling Yelp
#[derive(Debug, Error)]
pub enum YelpError {
    #[error("Yelp API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Yelp API error: {status}")]
    ApiError { status: u16 },

    #[error("Invalid Yelp request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Parameters for `/businesses/search`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub term: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<u32>,
    pub categories: Option<String>,
    pub price: Option<String>,
    pub open_now: bool,
    pub sort_by: String,
    pub limit: u32,
    pub offset: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            term: None,
            location: None,
            latitude: None,
            longitude: None,
            radius: None,
            categories: None,
            price: None,
            open_now: false,
            sort_by: "best_match".to_string(),
            limit: 20,
            offset: 0,
        }
    }
}

impl SearchParams {
    pub fn at(location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            ..Self::default()
        }
    }

    /// Encode as query pairs; fails without a location or coordinates
    fn to_query(&self) -> Result<Vec<(&'static str, String)>, YelpError> {
        let mut query = vec![
            (
                "term",
                self.term.clone().filter(|t| !t.is_empty()).unwrap_or_else(|| "restaurants".to_string()),
            ),
            ("sort_by", self.sort_by.clone()),
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];

        match (&self.location, self.latitude, self.longitude) {
            (Some(location), _, _) if !location.is_empty() => query.push(("location", location.clone())),
            (_, Some(lat), Some(lon)) => {
                query.push(("latitude", lat.to_string()));
                query.push(("longitude", lon.to_string()));
            }
            _ => return Err(YelpError::InvalidRequest("Either location or coordinates required".into())),
        }

        if let Some(radius) = self.radius.filter(|r| *r > 0) {
            query.push(("radius", radius.min(MAX_RADIUS_METERS).to_string()));
        }
        if let Some(categories) = self.categories.as_ref().filter(|c| !c.is_empty()) {
            query.push(("categories", categories.clone()));
        }
        if let Some(price) = self.price.as_ref().filter(|p| !p.is_empty()) {
            query.push(("price", price.clone()));
        }
        if self.open_now {
            query.push(("open_now", "true".to_string()));
        }

        Ok(query)
    }
}

impl From<RestaurantSearchQuery> for SearchParams {
    fn from(q: RestaurantSearchQuery) -> Self {
        Self {
            term: q.term,
            location: q.location,
            latitude: q.latitude,
            longitude: q.longitude,
            radius: q.radius,
            categories: q.categories,
            price: q.price,
            open_now: q.open_now,
            sort_by: q.sort_by,
            limit: q.limit,
            offset: q.offset,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub businesses: Vec<Restaurant>,
    #[serde(default)]
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Value>,
}

/// Yelp Fusion API client
///
/// Business details are cached for an hour when a cache is attached.
pub struct YelpClient {
    base_url: String,
    api_key: String,
    client: Client,
    cache: Option<Arc<CacheManager>>,
    business_ttl: Duration,
}

impl YelpClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, YelpError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            cache: None,
            business_ttl: Duration::from_secs(3600),
        })
    }

    pub fn with_cache(mut self, cache: Arc<CacheManager>, business_ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.business_ttl = business_ttl;
        self
    }

    async fn check(response: Response) -> Result<Response, YelpError> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Yelp returned {}", status);
            return Err(YelpError::ApiError { status: status.as_u16() });
        }
        Ok(response)
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, YelpError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| YelpError::InvalidResponse(e.to_string()))
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, YelpError> {
        let query = params.to_query()?;
        self.get_json("/businesses/search", &query).await
    }

    /// Restaurants suited to a taste profile: price band from the price
    /// sensitivity, top three cuisines as categories, sorted by rating
    pub async fn search_for_taste(
        &self,
        location: &str,
        profile: &TasteProfile,
        limit: u32,
    ) -> Result<Vec<Restaurant>, YelpError> {
        let params = taste_search_params(location, profile, limit);
        Ok(self.search(&params).await?.businesses)
    }

    pub async fn get_business(&self, business_id: &str) -> Result<Restaurant, YelpError> {
        let key = CacheKey::restaurant(business_id);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get_or_none::<Restaurant>(&key).await {
                return Ok(hit);
            }
        }

        let path = format!("/businesses/{}", urlencoding::encode(business_id));
        let restaurant: Restaurant = self.get_json(&path, &[]).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_with_ttl(&key, &restaurant, self.business_ttl).await {
                tracing::warn!("Failed to cache business {}: {}", business_id, e);
            }
        }
        Ok(restaurant)
    }

    pub async fn get_reviews(&self, business_id: &str, limit: u32) -> Result<Value, YelpError> {
        let path = format!("/businesses/{}/reviews", urlencoding::encode(business_id));
        let query = [
            ("locale", "en_US".to_string()),
            ("limit", limit.to_string()),
            ("sort_by", "yelp_sort".to_string()),
        ];
        self.get_json(&path, &query).await
    }

    pub async fn autocomplete(&self, text: &str, latitude: Option<f64>, longitude: Option<f64>) -> Result<Value, YelpError> {
        let mut query = vec![("text", text.to_string()), ("locale", "en_US".to_string())];
        if let (Some(lat), Some(lon)) = (latitude, longitude) {
            query.push(("latitude", lat.to_string()));
            query.push(("longitude", lon.to_string()));
        }
        self.get_json("/autocomplete", &query).await
    }

    /// Fetch each business in turn; ones that fail to load are skipped
    pub async fn businesses_by_ids(&self, ids: &[String]) -> Vec<Restaurant> {
        let mut restaurants = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_business(id).await {
                Ok(r) => restaurants.push(r),
                Err(e) => tracing::debug!("Skipping business {}: {}", id, e),
            }
        }
        restaurants
    }
}

/// Search parameters derived from a taste profile
pub fn taste_search_params(location: &str, profile: &TasteProfile, limit: u32) -> SearchParams {
    let categories: Vec<String> = profile
        .preferred_cuisines
        .iter()
        .take(3)
        .map(|c| c.to_lowercase().replace(' ', ""))
        .collect();

    SearchParams {
        price: Some(price_filter_for(profile.price_sensitivity).to_string()),
        categories: (!categories.is_empty()).then(|| categories.join(",")),
        sort_by: "rating".to_string(),
        limit,
        ..SearchParams::at(location)
    }
}
