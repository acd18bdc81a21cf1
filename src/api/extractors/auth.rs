use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::auth::{AuthenticatedUser, Claims};
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::{debug, Span};

pub struct AuthUser(pub AuthenticatedUser);

/// Bearer header first, then the `access_token` cookie.
pub(crate) fn access_token(parts: &Parts) -> Option<String> {
    let bearer = parts.headers.get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    parts.extensions.get::<Cookies>()
        .and_then(|cookies| cookies.get("access_token"))
        .map(|cookie| cookie.value().to_string())
}

pub(crate) fn decode_user(token: &str, state: &AppState) -> Result<AuthenticatedUser, AppError> {
    let decoding_key = DecodingKey::from_secret(state.config.auth_jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[state.config.auth_audience.as_str()]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| {
            debug!("Rejected access token: {}", e);
            AppError::Unauthorized
        })?;

    Ok(token_data.claims.into())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = access_token(parts).ok_or(AppError::Unauthorized)?;

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let user = decode_user(&token, &app_state)?;

        Span::current().record("user_id", user.id.as_str());

        Ok(AuthUser(user))
    }
}
