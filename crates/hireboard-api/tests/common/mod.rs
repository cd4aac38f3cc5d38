//! Shared fixtures for router tests: an in-memory store seeded with two
//! employers, two job seekers and one open job.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use hireboard_api::{create_router, ApiConfig, AppState, MemoryStore, SessionKeys, Stores};
use hireboard_models::{Job, Role, User};

pub const BOUNDARY: &str = "hireboard-test-boundary";
pub const HOST: &str = "api.test";
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub sessions: Arc<SessionKeys>,
    pub employer: User,
    pub other_employer: User,
    pub seeker: User,
    pub other_seeker: User,
    pub job: Job,
}

pub fn test_config() -> ApiConfig {
    ApiConfig {
        jwt_secret: "test-secret".to_string(),
        rate_limit_rps: 1000,
        ..Default::default()
    }
}

pub async fn test_app() -> TestApp {
    test_app_with(test_config()).await
}

pub async fn test_app_with(config: ApiConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());

    let employer = User::new("Acme Hiring", "hr@acme.test", Role::Employer);
    let other_employer = User::new("Globex Hiring", "hr@globex.test", Role::Employer);
    let seeker = User::new("Grace Hopper", "grace@example.com", Role::JobSeeker);
    let other_seeker = User::new("Alan Turing", "alan@example.com", Role::JobSeeker);
    for user in [&employer, &other_employer, &seeker, &other_seeker] {
        store.insert_user(user.clone()).await;
    }

    let job = Job::new("Rust Backend Engineer", "IT", "Kenya", 120_000, employer.id.clone());
    store.insert_job(job.clone()).await;

    let state = AppState::with_stores(config, Stores::from_backend(store.clone()));
    let sessions = state.sessions.clone();
    let router = create_router(state, None);

    TestApp {
        router,
        store,
        sessions,
        employer,
        other_employer,
        seeker,
        other_seeker,
        job,
    }
}

impl TestApp {
    pub fn token(&self, user: &User) -> String {
        self.sessions
            .issue(&user.id, Duration::hours(1))
            .expect("sign token")
    }

    pub fn bearer(&self, user: &User) -> String {
        format!("Bearer {}", self.token(user))
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, headers, body)
    }

    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(request).await;
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: Option<&User>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).header(header::HOST, HOST);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, self.bearer(user));
        }
        self.send_json(builder.body(Body::empty()).unwrap()).await
    }

    /// Submit the default form for `job_id` with `file`, as `user`.
    pub async fn submit(
        &self,
        user: &User,
        job_id: &str,
        file: Option<(&str, &str, &[u8])>,
    ) -> (StatusCode, Value) {
        let fields = [
            ("jobId", job_id),
            ("name", "Grace Hopper"),
            ("email", "grace@example.com"),
            ("phone", "555-0100"),
            ("address", "1 Navy Way, Arlington"),
            ("coverLetter", "I have shipped compilers."),
        ];
        self.submit_form(user, &fields, file).await
    }

    pub async fn submit_form(
        &self,
        user: &User,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/application/post")
            .header(header::HOST, HOST)
            .header(header::AUTHORIZATION, self.bearer(user))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields, file)))
            .unwrap();
        self.send_json(request).await
    }

    pub async fn update_status(&self, user: &User, id: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("PUT")
            .uri(format!("/api/v1/application/status/update/{}", id))
            .header(header::AUTHORIZATION, self.bearer(user))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send_json(request).await
    }

    pub async fn delete(&self, user: &User, id: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/v1/application/delete/{}", id))
            .header(header::AUTHORIZATION, self.bearer(user))
            .body(Body::empty())
            .unwrap();
        self.send_json(request).await
    }

    /// Add an open job from the primary employer, posted `days_old` days ago.
    pub async fn add_job(&self, title: &str, category: &str, salary: u64, days_old: i64) -> Job {
        let mut job = Job::new(title, category, "Kenya", salary, self.employer.id.clone());
        job.posted_on = Utc::now() - Duration::days(days_old);
        self.store.insert_job(job.clone()).await;
        job
    }
}

/// Hand-built `multipart/form-data` body.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
