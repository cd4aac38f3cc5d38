//! API configuration.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default cap on stored resume size. Firestore documents top out at 1 MiB.
pub const DEFAULT_RESUME_MAX_BYTES: usize = 1_000_000;

/// Configuration errors detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Firestore,
    /// Process-local maps; for development and tests.
    Memory,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "firestore" => Some(Self::Firestore),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Firestore => "firestore",
            Self::Memory => "memory",
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second, per client IP
    pub rate_limit_rps: u32,
    /// Take the client IP from `X-Forwarded-For` / `X-Real-IP`. Only enable
    /// behind a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
    /// Max request body size
    pub max_body_size: usize,
    /// Max resume upload size
    pub resume_max_bytes: usize,
    /// Public base URL used in resume links; falls back to the request host
    pub backend_url: Option<String>,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    pub store_backend: StoreBackend,
    /// JSON file with users and jobs loaded into the memory store
    pub memory_seed_path: Option<PathBuf>,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 20,
            trust_proxy_headers: false,
            max_body_size: 2 * 1024 * 1024,
            resume_max_bytes: DEFAULT_RESUME_MAX_BYTES,
            backend_url: None,
            jwt_secret: String::new(),
            store_backend: StoreBackend::default(),
            memory_seed_path: None,
            environment: "development".to_string(),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(fallback)
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let jwt_secret = std::env::var("JWT_SECRET_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET_KEY"))?;

        let backend_url = match std::env::var("BACKEND_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(normalize_base_url(&raw)?),
            _ => None,
        };

        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(raw) => StoreBackend::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "STORE_BACKEND",
                reason: format!("expected 'firestore' or 'memory', got '{}'", raw),
            })?,
            Err(_) => defaults.store_backend,
        };

        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_or("API_PORT", defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: env_or("RATE_LIMIT_RPS", defaults.rate_limit_rps),
            trust_proxy_headers: env_or("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers),
            max_body_size: env_or("MAX_BODY_SIZE", defaults.max_body_size),
            resume_max_bytes: env_or("RESUME_MAX_BYTES", defaults.resume_max_bytes),
            backend_url,
            jwt_secret,
            store_backend,
            memory_seed_path: std::env::var("MEMORY_SEED_PATH").ok().map(PathBuf::from),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// Validate an absolute http(s) URL and strip any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::Invalid {
        name: "BACKEND_URL",
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ConfigError::Invalid {
            name: "BACKEND_URL",
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "JWT_SECRET_KEY",
            "BACKEND_URL",
            "STORE_BACKEND",
            "API_PORT",
            "RESUME_MAX_BYTES",
            "CORS_ORIGINS",
            "TRUST_PROXY_HEADERS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_requires_jwt_secret() {
        clear_env();
        assert!(matches!(
            ApiConfig::from_env(),
            Err(ConfigError::Missing("JWT_SECRET_KEY"))
        ));
    }

    #[test]
    #[serial]
    fn test_reads_overrides() {
        clear_env();
        std::env::set_var("JWT_SECRET_KEY", "s3cret");
        std::env::set_var("BACKEND_URL", "https://api.example.com/");
        std::env::set_var("STORE_BACKEND", "Memory");
        std::env::set_var("API_PORT", "9000");
        std::env::set_var("RESUME_MAX_BYTES", "2048");
        std::env::set_var("CORS_ORIGINS", "http://a.test, http://b.test");
        std::env::set_var("TRUST_PROXY_HEADERS", "true");

        let config = ApiConfig::from_env().unwrap();
        assert!(config.trust_proxy_headers);
        assert_eq!(config.backend_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 9000);
        assert_eq!(config.resume_max_bytes, 2048);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_rejects_bad_backend_url_and_store() {
        clear_env();
        std::env::set_var("JWT_SECRET_KEY", "s3cret");
        std::env::set_var("BACKEND_URL", "ftp://files.example.com");
        assert!(matches!(ApiConfig::from_env(), Err(ConfigError::Invalid { .. })));

        std::env::remove_var("BACKEND_URL");
        std::env::set_var("STORE_BACKEND", "mongo");
        assert!(matches!(ApiConfig::from_env(), Err(ConfigError::Invalid { .. })));
        clear_env();
    }

    #[test]
    fn test_is_production() {
        let config = ApiConfig {
            environment: "Production".into(),
            ..Default::default()
        };
        assert!(config.is_production());
        assert!(!ApiConfig::default().is_production());
        assert!(!ApiConfig::default().trust_proxy_headers);
    }
}
