use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{LoginRequest, RegisterRequest, UserResponse, UserWithToken};
use crate::routes::{AppState, AuthenticatedUser};
use crate::services::auth::{hash_password, verify_password};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/me", web::get().to(me))
        .route("/refresh", web::post().to(refresh));
}

/// POST /api/v1/auth/register
async fn register(state: web::Data<AppState>, req: web::Json<RegisterRequest>) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let email = req.email.trim().to_lowercase();

    if state.postgres.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state.postgres.create_user(&email, &password_hash, req.name.trim()).await?;
    let token = state.jwt.sign(user.id)?;

    tracing::info!("Registered user {}", user.id);
    Ok(HttpResponse::Created().json(UserWithToken::bearer(&user, token)))
}

/// POST /api/v1/auth/login
async fn login(state: web::Data<AppState>, req: web::Json<LoginRequest>) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let email = req.email.trim().to_lowercase();

    let invalid = || ApiError::Unauthorized("Incorrect email or password".to_string());
    let user = state.postgres.get_user_by_email(&email).await?.ok_or_else(invalid)?;
    if !verify_password(&req.password, &user.password_hash) {
        tracing::info!("Failed login for {}", email);
        return Err(invalid());
    }

    let token = state.jwt.sign(user.id)?;
    Ok(HttpResponse::Ok().json(UserWithToken::bearer(&user, token)))
}

/// GET /api/v1/auth/me
async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// POST /api/v1/auth/refresh
async fn refresh(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let token = state.jwt.sign(user.id)?;
    Ok(HttpResponse::Ok().json(UserWithToken::bearer(&user, token)))
}
