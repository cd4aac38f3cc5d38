//! Router-level tests against the in-memory store.

mod common;

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;

use common::{test_app, test_app_with, test_config, HOST, PNG_BYTES};

fn png() -> Option<(&'static str, &'static str, &'static [u8])> {
    Some(("grace-cv.png", "image/png", PNG_BYTES))
}

fn message(body: &Value) -> &str {
    body["message"].as_str().unwrap_or_default()
}

// =============================================================================
// Operational endpoints
// =============================================================================

#[tokio::test]
async fn test_health_sets_security_headers_and_request_id() {
    let app = test_app().await;

    let (status, headers, _) = app
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("cross-origin-resource-policy").unwrap(), "same-origin");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app().await;

    let (_, headers, _) = app
        .send(
            Request::builder()
                .uri("/healthz")
                .header("x-request-id", "trace-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(headers.get("x-request-id").unwrap(), "trace-123");
}

#[tokio::test]
async fn test_ready_reports_memory_store() {
    let app = test_app().await;

    let (status, body) = app.get("/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["store"]["backend"], "memory");
}

#[tokio::test]
async fn test_metrics_route_absent_without_handle() {
    let app = test_app().await;
    let (status, _) = app.get("/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = test_app().await;

    let (status, body) = app.get("/api/v1/application/jobseeker/getall", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(message(&body), "User Not Authorized");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = test_app().await;

    let (status, _) = app
        .send_json(
            Request::builder()
                .uri("/api/v1/application/jobseeker/getall")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_unknown_user_is_unauthorized() {
    let app = test_app().await;
    let ghost = hireboard_models::User::new("Ghost", "ghost@example.com", hireboard_models::Role::JobSeeker);

    let (status, _) = app.get("/api/v1/application/jobseeker/getall", Some(&ghost)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let app = test_app().await;

    let (status, body) = app
        .send_json(
            Request::builder()
                .uri("/api/v1/application/jobseeker/getall")
                .header(header::COOKIE, format!("token={}", app.token(&app.seeker)))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["applications"].as_array().unwrap().len(), 0);
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_submit_creates_pending_application() {
    let app = test_app().await;

    let (status, body) = app.submit(&app.seeker, app.job.id.as_str(), png()).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(message(&body), "Application Submitted!");

    let application = &body["application"];
    assert_eq!(application["status"], "Pending");
    assert_eq!(application["jobId"], app.job.id.as_str());
    assert_eq!(application["coverLetter"], "I have shipped compilers.");
    assert_eq!(application["applicantID"]["user"], app.seeker.id.as_str());
    assert_eq!(application["applicantID"]["role"], "Job Seeker");
    assert_eq!(application["employerID"]["user"], app.employer.id.as_str());
    assert_eq!(application["employerID"]["role"], "Employer");
    assert_eq!(application["resume"]["contentType"], "image/png");
    assert_eq!(application["resume"]["originalName"], "grace-cv.png");
}

#[tokio::test]
async fn test_employer_cannot_submit() {
    let app = test_app().await;

    let (status, body) = app.submit(&app.employer, app.job.id.as_str(), png()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message(&body), "Employer not allowed to access this resource.");
}

#[tokio::test]
async fn test_submit_without_resume() {
    let app = test_app().await;

    let (status, body) = app.submit(&app.seeker, app.job.id.as_str(), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Resume File Required!");

    // A JSON body is not a form and carries no file.
    let (status, body) = app
        .send_json(
            Request::builder()
                .method("POST")
                .uri("/api/v1/application/post")
                .header(header::AUTHORIZATION, app.bearer(&app.seeker))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"jobId":"x"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Resume File Required!");
}

#[tokio::test]
async fn test_submit_rejects_non_image_resume() {
    let app = test_app().await;

    let (status, body) = app
        .submit(
            &app.seeker,
            app.job.id.as_str(),
            Some(("cv.pdf", "application/pdf", &b"%PDF-1.7"[..])),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let msg = message(&body);
    assert!(msg.contains("PNG") && msg.contains("JPEG") && msg.contains("WEBP"), "{msg}");
}

#[tokio::test]
async fn test_submit_rejects_oversized_resume() {
    let config = hireboard_api::ApiConfig {
        resume_max_bytes: 8,
        ..test_config()
    };
    let app = test_app_with(config).await;

    let (status, _) = app.submit(&app.seeker, app.job.id.as_str(), png()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = app.get("/api/v1/application/employer/getall", Some(&app.employer)).await;
    assert!(body["applications"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_to_unknown_job_writes_nothing() {
    let app = test_app().await;

    let (status, body) = app.submit(&app.seeker, "no-such-job", png()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Job not found!");

    let (status, body) = app.submit(&app.seeker, "", png()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Job not found!");

    let (_, body) = app.get("/api/v1/application/jobseeker/getall", Some(&app.seeker)).await;
    assert!(body["applications"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_requires_all_fields() {
    let app = test_app().await;
    let job_id = app.job.id.to_string();

    let fields = [
        ("jobId", job_id.as_str()),
        ("name", "Grace Hopper"),
        ("email", "grace@example.com"),
        ("phone", "   "),
        ("address", "1 Navy Way"),
        ("coverLetter", "Hello"),
    ];
    let (status, body) = app.submit_form(&app.seeker, &fields, png()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Please fill all fields.");

    let fields = [
        ("jobId", job_id.as_str()),
        ("name", "Grace Hopper"),
        ("email", "grace-at-example"),
        ("phone", "555"),
        ("address", "1 Navy Way"),
        ("coverLetter", "Hello"),
    ];
    let (status, body) = app.submit_form(&app.seeker, &fields, png()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Please provide a valid email.");
}

// =============================================================================
// Listing and resume retrieval
// =============================================================================

#[tokio::test]
async fn test_lists_are_scoped_and_carry_resume_links() {
    let app = test_app().await;
    let (_, submitted) = app.submit(&app.seeker, app.job.id.as_str(), png()).await;
    let id = submitted["application"]["_id"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/v1/application/employer/getall", Some(&app.employer)).await;
    assert_eq!(status, StatusCode::OK);
    let applications = body["applications"].as_array().unwrap();
    assert_eq!(applications.len(), 1);
    assert_eq!(
        applications[0]["resume"]["url"],
        format!("http://{}/api/v1/application/resume/{}", HOST, id)
    );
    assert!(applications[0]["resume"].get("data").is_none());

    let (_, body) = app
        .get("/api/v1/application/employer/getall", Some(&app.other_employer))
        .await;
    assert!(body["applications"].as_array().unwrap().is_empty());

    let (_, body) = app
        .get("/api/v1/application/jobseeker/getall", Some(&app.other_seeker))
        .await;
    assert!(body["applications"].as_array().unwrap().is_empty());

    let (status, body) = app
        .get("/api/v1/application/employer/getall", Some(&app.seeker))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message(&body), "Job Seeker not allowed to access this resource.");
}

#[tokio::test]
async fn test_resume_is_served_to_both_parties_only() {
    let app = test_app().await;
    let (_, submitted) = app.submit(&app.seeker, app.job.id.as_str(), png()).await;
    let id = submitted["application"]["_id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/application/resume/{}", id);

    for user in [&app.employer, &app.seeker] {
        let (status, headers, bytes) = app
            .send(
                Request::builder()
                    .uri(&uri)
                    .header(header::AUTHORIZATION, app.bearer(user))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).unwrap(),
            "inline; filename=\"grace-cv.png\""
        );
        assert_eq!(headers.get("cross-origin-resource-policy").unwrap(), "cross-origin");
        assert_eq!(bytes.as_ref(), PNG_BYTES);
    }

    for user in [&app.other_employer, &app.other_seeker] {
        let (status, _) = app.get(&uri, Some(user)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, body) = app.get("/api/v1/application/resume/unknown", Some(&app.employer)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Application not found!");
}

// =============================================================================
// Review and withdrawal
// =============================================================================

#[tokio::test]
async fn test_status_update_flow() {
    let app = test_app().await;
    let (_, submitted) = app.submit(&app.seeker, app.job.id.as_str(), png()).await;
    let id = submitted["application"]["_id"].as_str().unwrap().to_string();

    let (status, body) = app.update_status(&app.seeker, &id, r#"{"status":"Accepted"}"#).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message(&body), "Job Seeker not allowed to access this resource.");

    let (status, body) = app.update_status(&app.employer, &id, r#"{}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Please provide a status.");

    let (status, _) = app.update_status(&app.employer, &id, r#"{"status":"Hired"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .update_status(&app.other_employer, &id, r#"{"status":"Rejected"}"#)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .update_status(&app.employer, "missing", r#"{"status":"Rejected"}"#)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Application not found!");

    let (status, body) = app.update_status(&app.employer, &id, r#"{"status":"Accepted"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "Application Status Updated!");

    let (_, body) = app.get("/api/v1/application/jobseeker/getall", Some(&app.seeker)).await;
    assert_eq!(body["applications"][0]["status"], "Accepted");
}

#[tokio::test]
async fn test_delete_flow() {
    let app = test_app().await;
    let (_, submitted) = app.submit(&app.seeker, app.job.id.as_str(), png()).await;
    let id = submitted["application"]["_id"].as_str().unwrap().to_string();

    let (status, _) = app.delete(&app.employer, &id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&app.other_seeker, &id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&app.seeker, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message(&body), "Application Deleted!");

    let (_, body) = app.get("/api/v1/application/employer/getall", Some(&app.employer)).await;
    assert!(body["applications"].as_array().unwrap().is_empty());

    let (status, body) = app.delete(&app.seeker, &id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Application not found!");
}

// =============================================================================
// Job catalogue
// =============================================================================

#[tokio::test]
async fn test_job_listing_filters_sorts_and_pages() {
    let app = test_app().await;
    app.add_job("Senior Rust Engineer", "IT", 200_000, 3).await;
    app.add_job("Rust Intern", "IT", 20_000, 1).await;
    app.add_job("Graphic Designer", "Design", 50_000, 2).await;

    let (status, body) = app
        .get("/api/v1/job/getall?keyword=rust&category=IT&sort=salaryHigh&limit=2", Some(&app.seeker))
        .await;
    assert_eq!(status, StatusCode::OK);
    let salaries: Vec<u64> = body["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["salary"].as_u64().unwrap())
        .collect();
    assert_eq!(salaries, vec![200_000, 120_000]);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 2);

    let (_, body) = app
        .get("/api/v1/job/getall?keyword=rust&category=IT&sort=salaryHigh&limit=2&page=2", Some(&app.seeker))
        .await;
    assert_eq!(body["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(body["jobs"][0]["title"], "Rust Intern");

    let (_, body) = app.get("/api/v1/job/getall?sort=oldest", Some(&app.employer)).await;
    assert_eq!(body["jobs"][0]["title"], "Senior Rust Engineer");
    assert_eq!(body["limit"], 8);
}

#[tokio::test]
async fn test_job_listing_far_page_is_empty() {
    let app = test_app().await;

    let (status, body) = app
        .get("/api/v1/job/getall?page=50000000&limit=50", Some(&app.seeker))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["jobs"].as_array().unwrap().is_empty());
    assert_eq!(body["page"], hireboard_models::MAX_PAGE);
}

#[tokio::test]
async fn test_job_details() {
    let app = test_app().await;

    let (status, body) = app
        .get(&format!("/api/v1/job/{}", app.job.id), Some(&app.seeker))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job"]["title"], "Rust Backend Engineer");
    assert_eq!(body["job"]["postedBy"], app.employer.id.as_str());

    let (status, body) = app.get("/api/v1/job/nope", Some(&app.seeker)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Job not found!");

    let (status, _) = app.get("/api/v1/job/getall?page=abc", Some(&app.seeker)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn test_rate_limit_per_client_ip() {
    let config = hireboard_api::ApiConfig {
        rate_limit_rps: 1,
        trust_proxy_headers: true,
        ..test_config()
    };
    let app = test_app_with(config).await;

    let request = |ip: &str| {
        Request::builder()
            .uri("/api/v1/job/getall")
            .header("x-forwarded-for", ip)
            .header(header::AUTHORIZATION, app.bearer(&app.seeker))
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = app.send_json(request("203.0.113.5")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, headers, _) = app.send(request("203.0.113.5")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(headers.get(header::RETRY_AFTER).unwrap(), "1");

    let (status, _) = app.send_json(request("203.0.113.6")).await;
    assert_eq!(status, StatusCode::OK);

    // Probes are never limited.
    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_ignores_forwarded_for_by_default() {
    let config = hireboard_api::ApiConfig {
        rate_limit_rps: 1,
        ..test_config()
    };
    let app = test_app_with(config).await;
    let peer: SocketAddr = "198.51.100.20:40000".parse().unwrap();

    let request = |forwarded: &str| {
        let mut request = Request::builder()
            .uri("/api/v1/job/getall")
            .header("x-forwarded-for", forwarded)
            .header(header::AUTHORIZATION, app.bearer(&app.seeker))
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        request
    };

    let (status, _) = app.send_json(request("203.0.113.5")).await;
    assert_eq!(status, StatusCode::OK);

    // A fresh header value does not buy a fresh quota.
    let (status, _) = app.send_json(request("203.0.113.99")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}
