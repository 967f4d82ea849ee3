use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{TwinCountResponse, TwinsListResponse};
use crate::routes::{AppState, AuthenticatedUser};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_twins))
        .route("/count", web::get().to(twin_count))
        .route("/refresh", web::post().to(refresh_twins))
        .route("/{twin_id}", web::get().to(get_twin));
}

async fn list_twins(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let twins = state.twins.get_user_twins(user.id).await?;
    Ok(HttpResponse::Ok().json(TwinsListResponse::from(twins)))
}

async fn twin_count(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let count = state.twins.get_twin_count(user.id).await?;
    Ok(HttpResponse::Ok().json(TwinCountResponse { count }))
}

async fn get_twin(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let twin_id = path.into_inner();
    let twin = state
        .twins
        .get_user_twins(user.id)
        .await?
        .into_iter()
        .find(|t| t.twin_id == twin_id)
        .ok_or_else(|| ApiError::not_found("Twin"))?;

    Ok(HttpResponse::Ok().json(twin))
}

async fn refresh_twins(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    state.require_taste_dna(user.id).await?;
    let twins = state.twins.refresh_twins(user.id).await?;
    Ok(HttpResponse::Ok().json(TwinsListResponse::from(twins)))
}
