use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{UpdateProfileRequest, UserResponse};
use crate::routes::{AppState, AuthenticatedUser};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profile", web::get().to(get_profile))
        .route("/profile", web::put().to(update_profile))
        .route("/{user_id}", web::get().to(get_user));
}

async fn get_profile(AuthenticatedUser(user): AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// PUT /api/v1/users/profile
///
/// Only the fields present in the body change; an empty name is ignored.
async fn update_profile(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let updated = state
        .postgres
        .update_user_profile(user.id, name, req.avatar_url.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}

async fn get_user(
    state: web::Data<AppState>,
    _caller: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .postgres
        .get_user(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
