use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::error::ApiError;
use crate::models::User;
use crate::routes::AppState;

/// The account behind a valid `Authorization: Bearer <jwt>` header
pub struct AuthenticatedUser(pub User);

/// Token part of a bearer header, accepting either case of the scheme
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let state = state.ok_or_else(|| ApiError::Internal("application state missing".to_string()))?;

            let header = header.ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?;
            let token =
                bearer_token(&header).ok_or_else(|| ApiError::Unauthorized("invalid auth scheme".to_string()))?;

            let claims = state.jwt.verify(token)?;

            let user = state
                .postgres
                .get_user(claims.sub)
                .await?
                .ok_or_else(|| ApiError::Unauthorized("user no longer exists".to_string()))?;

            Ok(AuthenticatedUser(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }
}
