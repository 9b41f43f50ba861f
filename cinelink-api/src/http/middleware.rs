// HTTP middleware: authenticated-user extractors

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use cinelink_core::models::User;

use super::{AppError, AppState};

/// Authenticated user extracted from a JWT bearer token
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|e| AppError::unauthorized(format!("Invalid Authorization header: {e}")))?;

        let claims = app_state
            .jwt_service
            .decode_bearer(auth_str)
            .map_err(|e| AppError::unauthorized(format!("{e}")))?;

        // Tokens outlive accounts; the user row is the source of truth for
        // existence and role
        let user = app_state
            .users
            .get_by_id(&claims.user_id())
            .await
            .map_err(|_| AppError::unauthorized("Authentication failed"))?
            .ok_or_else(|| AppError::unauthorized("User not found"))?;

        Ok(Self(user))
    }
}

/// Authenticated user holding the operator role. Rejections are 401 to match
/// the public API contract.
#[derive(Debug, Clone)]
pub struct OperatorUser(pub User);

impl<S> FromRequestParts<S> for OperatorUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.role.is_operator() {
            return Err(AppError::unauthorized("Operator role required"));
        }

        Ok(Self(user))
    }
}
