//! Authorization gate and extractors

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::models::Claims;
use crate::auth::token::{self, TokenKey};
use crate::error::{AuthError, Error};

/// Run the gate over a request's headers.
///
/// Structural problems are rejected before any decryption is attempted. The
/// scheme word is not checked, only that the header has exactly two fields.
pub fn authorize(headers: &HeaderMap, key: &TokenKey) -> Result<Claims, AuthError> {
    let value = match headers.get(AUTHORIZATION) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AuthError::MissingToken),
    };
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let mut fields = value.split_whitespace();
    let (Some(_scheme), Some(token), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(AuthError::MalformedHeader);
    };

    token::decode(token, key).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        AuthError::InvalidToken
    })
}

/// Middleware for routes that require a valid session token. Admitted
/// requests carry the decoded [`Claims`] in their extensions.
pub async fn require_auth(
    State(key): State<Arc<TokenKey>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Error> {
    let claims = authorize(req.headers(), &key)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Claims of the caller, as attached by [`require_auth`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .copied()
            .map(AuthUser)
            .ok_or(Error::Auth(AuthError::MissingToken))
    }
}
