//! Session authentication.
//!
//! A session is a `username` cookie paired with an HS256 token (the
//! `jwt_token` cookie, or `Authorization: Bearer`) whose subject is that same
//! username. Tokens are issued elsewhere; this module only validates them.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use herald_common::error::AppError;

use crate::state::AppState;

pub const TOKEN_COOKIE: &str = "jwt_token";
pub const USERNAME_COOKIE: &str = "username";

/// JWT claims stored in the session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the username
    pub sub: String,
    /// Expiration time (UNIX timestamp)
    pub exp: i64,
    /// Issued at (UNIX timestamp)
    pub iat: i64,
}

/// Authenticated user extracted from the session cookies.
///
/// Rejects the request with 401 when no valid session is present.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub username: String,
    pub claims: Claims,
}

/// Session if one is present, `None` otherwise. Never rejects.
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<SessionUser>);

impl OptionalSession {
    pub fn username(&self) -> Option<&str> {
        self.0.as_ref().map(|s| s.username.as_str())
    }
}

/// Encode a session token for a user.
pub fn encode_jwt(username: &str, secret: &str, expiry_hours: u64) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiry_hours as i64);

    let claims = Claims {
        sub: username.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Auth(format!("Failed to encode JWT: {}", e)))
}

/// Decode and validate a session token.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

/// Read a cookie value from all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Validate the session carried by a request's headers.
pub fn session_from_headers(headers: &HeaderMap, secret: &str) -> Result<SessionUser, AppError> {
    let username = read_cookie(headers, USERNAME_COOKIE)
        .ok_or_else(|| AppError::Auth("Not authenticated".to_string()))?;

    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string());

    let token = read_cookie(headers, TOKEN_COOKIE)
        .or(bearer)
        .ok_or_else(|| AppError::Auth("Not authenticated".to_string()))?;

    let claims = decode_jwt(&token, secret)?;
    if claims.sub != username {
        return Err(AppError::Auth(
            "Session token does not belong to this user".to_string(),
        ));
    }

    Ok(SessionUser { username, claims })
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = session_from_headers(&parts.headers, &state.config.jwt_secret);
        async move { result }
    }
}

impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let session = session_from_headers(&parts.headers, &state.config.jwt_secret).ok();
        async move { Ok(OptionalSession(session)) }
    }
}
