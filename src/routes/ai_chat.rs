use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{
    AiCompareRequest, ChatRequest, RecommendationRequest, RestaurantQuestionRequest, SmartSearchQuery, TasteProfile,
};
use crate::routes::{AppState, AuthenticatedUser};
use crate::services::ChatOptions;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/chat", web::post().to(chat))
        .route("/compare", web::post().to(compare))
        .route("/recommend", web::post().to(recommend))
        .route("/ask", web::post().to(ask))
        .route("/smart-search", web::get().to(smart_search));
}

async fn stored_profile(state: &AppState, user_id: Uuid) -> Result<Option<TasteProfile>, ApiError> {
    Ok(state.postgres.get_taste_dna(user_id).await?.map(|dna| dna.profile()))
}

/// POST /api/v1/ai-chat/chat
///
/// The first turn of a conversation is enriched with the caller's TasteDNA;
/// follow-up turns carry the chat id instead.
async fn chat(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let req = req.into_inner();

    let profile = if req.use_taste_dna {
        stored_profile(&state, user.id).await?
    } else {
        None
    };

    let reply = match (profile, req.chat_id) {
        (Some(profile), None) => {
            state
                .yelp_ai
                .search_with_context(&req.query, Some(&profile), req.latitude, req.longitude)
                .await?
        }
        (_, chat_id) => {
            let options = ChatOptions {
                chat_id,
                ..ChatOptions::located(req.latitude, req.longitude)
            };
            state.yelp_ai.chat(&req.query, options).await?
        }
    };

    Ok(HttpResponse::Ok().json(reply))
}

async fn compare(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    req: web::Json<AiCompareRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let reply = state
        .yelp_ai
        .compare_restaurants(&req.restaurant_ids, &req.criteria, req.latitude, req.longitude)
        .await?;
    Ok(HttpResponse::Ok().json(reply))
}

/// Occasion-based picks, personalised when a profile exists
async fn recommend(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<RecommendationRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let profile = stored_profile(&state, user.id).await?;

    let reply = state
        .yelp_ai
        .recommend_for_occasion(
            &req.occasion,
            req.party_size,
            req.date_time.as_deref(),
            profile.as_ref(),
            req.latitude,
            req.longitude,
        )
        .await?;
    Ok(HttpResponse::Ok().json(reply))
}

async fn ask(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    req: web::Json<RestaurantQuestionRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let reply = state
        .yelp_ai
        .ask_about_restaurant(&req.restaurant_id, &req.question, req.latitude, req.longitude)
        .await?;
    Ok(HttpResponse::Ok().json(reply))
}

/// GET /api/v1/ai-chat/smart-search?query=...
async fn smart_search(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<SmartSearchQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let profile = stored_profile(&state, user.id).await?;

    let reply = state
        .yelp_ai
        .search_with_context(&query.query, profile.as_ref(), query.latitude, query.longitude)
        .await?;
    Ok(HttpResponse::Ok().json(reply))
}
