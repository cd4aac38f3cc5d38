//! Axum HTTP API server.
//!
//! This crate provides:
//! - The application lifecycle API (submit, list, resume fetch, withdraw, review)
//! - A read-only job catalogue
//! - Session token authentication and role/ownership checks
//! - Rate limiting, security headers and Prometheus metrics

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;
pub mod store;

pub use auth::{AuthUser, SessionKeys};
pub use config::{ApiConfig, StoreBackend};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{ApplicationService, JobCatalogue};
pub use state::AppState;
pub use store::{MemoryStore, Stores};
