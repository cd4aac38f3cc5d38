//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    delete_application, employer_get_all, get_all_jobs, get_job, get_resume, health,
    jobseeker_get_all, post_application, ready, update_status,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, hide_internal_errors, rate_limit_middleware, request_id, request_logging,
    security_headers, RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let application_routes = Router::new()
        .route("/post", post(post_application))
        .route("/employer/getall", get(employer_get_all))
        .route("/jobseeker/getall", get(jobseeker_get_all))
        .route("/delete/:id", delete(delete_application))
        .route("/status/update/:id", put(update_status))
        .route("/resume/:id", get(get_resume));

    let job_routes = Router::new()
        .route("/getall", get(get_all_jobs))
        .route("/:id", get(get_job));

    let rate_limiter = Arc::new(
        RateLimiterCache::new(state.config.rate_limit_rps)
            .with_proxy_headers(state.config.trust_proxy_headers),
    );

    let api_routes = Router::new()
        .nest("/application", application_routes)
        .nest("/job", job_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // The multipart extractor has its own 2 MB default; the layer below is the real cap.
        .layer(middleware::from_fn_with_state(
            state.config.is_production(),
            hide_internal_errors,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
