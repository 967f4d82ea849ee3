use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::gamification::visit_milestone;
use crate::core::quiz::apply_interaction;
use crate::error::ApiError;
use crate::models::{
    ActionType, AutocompleteQuery, LogInteractionRequest, MessageResponse, RestaurantSearchQuery, ReviewsQuery,
    SaveRestaurantRequest, SavedRestaurantResponse, User,
};
use crate::routes::{AppState, AuthenticatedUser};
use crate::services::SearchParams;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/search", web::get().to(search))
        .route("/autocomplete", web::get().to(autocomplete))
        .route("/saved/list", web::get().to(saved_list))
        .route("/{restaurant_id}", web::get().to(get_restaurant))
        .route("/{restaurant_id}/reviews", web::get().to(get_reviews))
        .route("/{restaurant_id}/save", web::post().to(save))
        .route("/{restaurant_id}/save", web::delete().to(unsave))
        .route("/{restaurant_id}/log", web::post().to(log_interaction));
}

/// GET /api/v1/restaurants/search
async fn search(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    query: web::Query<RestaurantSearchQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let params = SearchParams::from(query.into_inner());
    let results = state.yelp.search(&params).await?;
    Ok(HttpResponse::Ok().json(results))
}

async fn autocomplete(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    query: web::Query<AutocompleteQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let suggestions = state
        .yelp
        .autocomplete(&query.text, query.latitude, query.longitude)
        .await?;
    Ok(HttpResponse::Ok().json(suggestions))
}

async fn get_restaurant(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let restaurant = state.yelp.get_business(&path).await?;
    Ok(HttpResponse::Ok().json(restaurant))
}

async fn get_reviews(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
    query: web::Query<ReviewsQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let reviews = state.yelp.get_reviews(&path, query.limit).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// Save (or re-save with new notes) a restaurant, snapshotting its Yelp data
async fn save(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
    req: Option<web::Json<SaveRestaurantRequest>>,
) -> Result<HttpResponse, ApiError> {
    let restaurant_id = path.into_inner();
    let notes = req.and_then(|r| r.into_inner().notes);
    let restaurant = state.yelp.get_business(&restaurant_id).await?;
    let snapshot = serde_json::to_value(&restaurant).ok();

    state
        .postgres
        .save_restaurant(user.id, &restaurant_id, Some(&restaurant.name), snapshot, notes.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Restaurant saved successfully")))
}

async fn unsave(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.postgres.unsave_restaurant(user.id, &path).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Restaurant removed from saved list")))
}

/// Saved restaurants with fresh Yelp data; entries Yelp no longer serves are left out
async fn saved_list(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let saved = state.postgres.list_saved_restaurants(user.id).await?;

    let mut list = Vec::with_capacity(saved.len());
    for entry in saved {
        match state.yelp.get_business(&entry.restaurant_id).await {
            Ok(fresh) => list.push(SavedRestaurantResponse {
                restaurant_id: entry.restaurant_id,
                restaurant_name: if fresh.name.is_empty() {
                    entry.restaurant_name.unwrap_or_default()
                } else {
                    fresh.name.clone()
                },
                restaurant_data: fresh,
                notes: entry.notes,
                saved_at: entry.created_at,
            }),
            Err(e) => tracing::debug!("Dropping saved restaurant {}: {}", entry.restaurant_id, e),
        }
    }

    Ok(HttpResponse::Ok().json(list))
}

/// POST /api/v1/restaurants/{id}/log
///
/// Positive actions feed interaction learning; visits count towards the
/// explorer achievements.
async fn log_interaction(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<String>,
    req: web::Json<LogInteractionRequest>,
) -> Result<HttpResponse, ApiError> {
    let restaurant_id = path.into_inner();
    let action = ActionType::parse(&req.action_type)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown action type: {}", req.action_type)))?;

    state
        .postgres
        .log_interaction(
            user.id,
            &restaurant_id,
            action.as_str(),
            req.context.as_deref(),
            req.session_id.as_deref(),
        )
        .await?;

    if action.is_positive() {
        learn_from_interaction(&state, &user, action, &restaurant_id).await?;
    }

    if action == ActionType::Visited {
        let visits = state.postgres.count_interactions(user.id, action.as_str()).await?;
        if let Some(achievement) = visit_milestone(visits) {
            if !state.postgres.has_achievement(user.id, achievement).await? {
                state.postgres.award_achievement(user.id, achievement, None).await?;
                tracing::info!("User {} earned {}", user.id, achievement);
            }
        }
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Interaction logged")))
}

async fn learn_from_interaction(
    state: &AppState,
    user: &User,
    action: ActionType,
    restaurant_id: &str,
) -> Result<(), ApiError> {
    let Some(dna) = state.postgres.get_taste_dna(user.id).await? else {
        return Ok(());
    };

    let restaurant = state.yelp.get_business(restaurant_id).await?;
    let mut profile = dna.profile();
    if apply_interaction(&mut profile, action, &restaurant) {
        state.postgres.update_learned_scores(user.id, &profile).await?;
        tracing::debug!("Updated learned scores for user {} after {}", user.id, action.as_str());
    }
    Ok(())
}
