//! Access token caching for Firestore.
//!
//! Tokens are refreshed a minute before expiry. Refresh is single-flight
//! behind a write lock, and a still-usable token is kept if a refresh fails.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use gcp_auth::TokenProvider;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{FirestoreError, FirestoreResult};

/// Refresh a token this long before it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// TTL assumed when the provider reports none.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(50 * 60);

/// OAuth scope for Firestore REST access.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }

    fn is_usable(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

enum TokenSource {
    /// Service-account credentials.
    Provider(Arc<dyn TokenProvider>),
    /// Fixed bearer token (emulator, tests).
    Fixed(String),
}

/// Thread-safe token cache.
pub struct TokenCache {
    source: TokenSource,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    /// Cache tokens from a provider.
    pub fn new(auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            source: TokenSource::Provider(auth),
            cache: RwLock::new(None),
        }
    }

    /// Always hand out the same token.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Fixed(token.into()),
            cache: RwLock::new(None),
        }
    }

    /// Drop the cached token so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_token(&self) -> FirestoreResult<String> {
        let auth = match &self.source {
            TokenSource::Fixed(token) => return Ok(token.clone()),
            TokenSource::Provider(auth) => auth,
        };

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
                return Ok(cached.access_token.clone());
            }
        }

        let mut cache = self.cache.write().await;

        // Another task may have refreshed while we waited for the lock.
        if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh()) {
            return Ok(cached.access_token.clone());
        }

        match auth.token(&[FIRESTORE_SCOPE]).await {
            Ok(token) => {
                let now = Utc::now();
                let exp = token.expires_at();
                let expires_at = if exp > now {
                    Instant::now() + (exp - now).to_std().unwrap_or(TOKEN_DEFAULT_TTL)
                } else {
                    Instant::now()
                };

                let access_token = token.as_str().to_string();
                *cache = Some(CachedToken {
                    access_token: access_token.clone(),
                    expires_at,
                });

                debug!("Refreshed Firestore access token");
                Ok(access_token)
            }
            Err(e) => {
                if let Some(cached) = cache.as_ref().filter(|c| c.is_usable()) {
                    warn!("Token refresh failed, using existing token: {}", e);
                    return Ok(cached.access_token.clone());
                }

                Err(FirestoreError::auth_error(format!(
                    "Failed to obtain auth token: {}",
                    e
                )))
            }
        }
    }
}
