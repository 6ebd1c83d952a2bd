use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use tracing::debug;

use crate::{api::AppState, auth::jwt::decode_jwt, error::ApiError};

/// The account behind the request's bearer token.
///
/// Use `Option<AuthenticatedUser>` where a login is optional: a missing
/// `Authorization` header yields `None`, a bad token is still rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            <TypedHeader<Authorization<Bearer>> as FromRequestParts<AppState>>::from_request_parts(
                parts, state,
            )
            .await
            .map_err(|_| ApiError::Unauthenticated)?;

        let user_id = decode_jwt(bearer.token(), &state.jwt_secret).map_err(|err| {
            debug!(?err, "rejected bearer token");
            ApiError::Unauthenticated
        })?;

        Ok(AuthenticatedUser { user_id })
    }
}

impl OptionalFromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(None);
        }

        <AuthenticatedUser as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
