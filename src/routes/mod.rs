// Route exports
pub mod ai_chat;
pub mod auth;
pub mod date_night;
pub mod discovery;
pub mod extractors;
pub mod gamification;
pub mod image_search;
pub mod restaurants;
pub mod taste_dna;
pub mod twins;
pub mod users;

use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::models::{HealthResponse, TasteDna};
use crate::error::ApiError;
use crate::services::{CacheManager, JwtKeys, PostgresClient, TwinMatchingService, YelpAiClient, YelpClient};

pub use extractors::AuthenticatedUser;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    pub yelp: Arc<YelpClient>,
    pub yelp_ai: Arc<YelpAiClient>,
    pub twins: Arc<TwinMatchingService>,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    /// The caller's stored profile or a 404
    pub async fn require_taste_dna(&self, user_id: uuid::Uuid) -> Result<TasteDna, ApiError> {
        self.postgres
            .get_taste_dna(user_id)
            .await?
            .ok_or_else(ApiError::taste_dna_not_found)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .service(web::scope("/auth").configure(auth::configure))
                .service(web::scope("/users").configure(users::configure))
                .service(web::scope("/taste-dna").configure(taste_dna::configure))
                .service(web::scope("/twins").configure(twins::configure))
                .service(web::scope("/discovery").configure(discovery::configure))
                .service(web::scope("/restaurants").configure(restaurants::configure))
                .service(web::scope("/image-search").configure(image_search::configure))
                .service(web::scope("/date-night").configure(date_night::configure))
                .service(web::scope("/gamification").configure(gamification::configure))
                .service(web::scope("/ai-chat").configure(ai_chat::configure)),
        );
}

async fn root() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "name": "TasteSync API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/health",
    }))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database = state.postgres.health_check().await.unwrap_or(false);
    let cache = state.cache.health_check().await.is_ok();

    let status = if database { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        database,
        cache,
    })
}
