//! Session token authentication.
//!
//! Sessions are HS256 JWTs issued by the sign-in flow and carried either in
//! the `token` cookie or an `Authorization: Bearer` header. The token only
//! names the user; the role is always read from the stored account.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use hireboard_models::{Role, User, UserId};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Cookie that carries the session token.
pub const SESSION_COOKIE: &str = "token";

const NOT_AUTHORIZED: &str = "User Not Authorized";

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: String,
    /// Expiration (seconds since epoch)
    pub exp: i64,
    /// Issued at
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Signing and verification keys for session tokens.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Sign a token for `user` valid for `ttl`.
    pub fn issue(&self, user: &UserId, ttl: Duration) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user.to_string(),
            exp: (now + ttl).timestamp(),
            iat: Some(now.timestamp()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign session token: {}", e)))
    }

    /// Verify signature and expiry.
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Session token rejected: {}", e);
                metrics::record_auth_failure("invalid_token");
                ApiError::unauthorized(NOT_AUTHORIZED)
            })
    }
}

/// Authenticated caller, resolved from the account store.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
        }
    }
}

/// Session token from the cookie, else from a Bearer header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Axum extractor for the authenticated caller.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(|| {
            metrics::record_auth_failure("missing_token");
            ApiError::unauthorized(NOT_AUTHORIZED)
        })?;

        let claims = state.sessions.verify(&token)?;

        let user_id = UserId::from(claims.id);
        let user = state.stores.users.get_user(&user_id).await?.ok_or_else(|| {
            warn!(user_id = %user_id, "Session token names an unknown user");
            metrics::record_auth_failure("unknown_user");
            ApiError::unauthorized(NOT_AUTHORIZED)
        })?;

        Ok(AuthUser::from(user))
    }
}
