use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::state::AppState;
use crate::domain::models::auth::AuthenticatedUser;
use crate::api::extractors::auth::{access_token, decode_user};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::Span;

/// Identity for endpoints that also serve guests. Bad tokens are treated as no token.
pub struct MaybeAuthUser(pub Option<AuthenticatedUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = access_token(parts) else {
            return Ok(MaybeAuthUser(None));
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let user = decode_user(&token, &app_state).ok();
        if let Some(user) = &user {
            Span::current().record("user_id", user.id.as_str());
        }

        Ok(MaybeAuthUser(user))
    }
}
