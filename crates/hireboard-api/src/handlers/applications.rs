//! Application lifecycle handlers.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use hireboard_models::{Application, ApplicationView, ResumeUpload};

use crate::access::{self, Operation};
use crate::auth::AuthUser;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::security::inline_disposition;
use crate::services::SubmitApplication;
use crate::state::AppState;

/// Generic success response.
#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    fn ok(message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub application: Application,
}

#[derive(Serialize)]
pub struct ApplicationsResponse {
    pub success: bool,
    pub applications: Vec<ApplicationView>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// Base for resume links: `BACKEND_URL`, else the scheme and host the
/// request arrived on.
fn public_base_url(config: &ApiConfig, headers: &HeaderMap) -> String {
    if let Some(url) = &config.backend_url {
        return url.clone();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| matches!(*s, "http" | "https"))
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");

    format!("{}://{}", scheme, host)
}

/// Media type without parameters, lowercased.
fn essence(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Collect the submission form. Unknown fields are ignored; the first
/// non-empty `resume` part wins.
async fn read_submission(mut multipart: Multipart) -> ApiResult<SubmitApplication> {
    let mut input = SubmitApplication::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "resume" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = essence(field.content_type());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e.body_text())))?;

            // Browsers send an empty part when no file was chosen.
            if input.resume.is_none() && !(bytes.is_empty() && file_name.is_empty()) {
                input.resume = Some(ResumeUpload {
                    bytes: bytes.to_vec(),
                    content_type,
                    file_name,
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e.body_text())))?;
        match name.as_str() {
            "jobId" => input.job_id = Some(value),
            "name" => input.details.name = value,
            "email" => input.details.email = value,
            "phone" => input.details.phone = value,
            "address" => input.details.address = value,
            "coverLetter" => input.details.cover_letter = value,
            other => debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(input)
}

/// Submit an application (multipart form).
pub async fn post_application(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    // Role comes before anything about the body.
    access::authorize(Operation::SubmitApplication, &user)?;

    let input = match multipart {
        Ok(multipart) => read_submission(multipart).await?,
        // Not a form at all: there is no file either.
        Err(_) => SubmitApplication::default(),
    };

    let application = state.applications.submit(&user, input).await?;

    Ok(Json(SubmitResponse {
        success: true,
        message: "Application Submitted!",
        application,
    }))
}

/// Applications received by the calling employer.
pub async fn employer_get_all(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
) -> ApiResult<Json<ApplicationsResponse>> {
    let base_url = public_base_url(&state.config, &headers);
    let applications = state.applications.list_for_employer(&user, &base_url).await?;
    Ok(Json(ApplicationsResponse {
        success: true,
        applications,
    }))
}

/// Applications submitted by the calling job seeker.
pub async fn jobseeker_get_all(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
) -> ApiResult<Json<ApplicationsResponse>> {
    let base_url = public_base_url(&state.config, &headers);
    let applications = state.applications.list_for_job_seeker(&user, &base_url).await?;
    Ok(Json(ApplicationsResponse {
        success: true,
        applications,
    }))
}

/// Withdraw an application.
pub async fn delete_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.applications.delete(&user, &id).await?;
    Ok(MessageResponse::ok("Application Deleted!"))
}

/// Set an application's review status.
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    // An unreadable body carries no status.
    let status = body.ok().and_then(|Json(req)| req.status);
    state
        .applications
        .update_status(&user, &id, status.as_deref())
        .await?;
    Ok(MessageResponse::ok("Application Status Updated!"))
}

/// Serve the stored resume bytes.
pub async fn get_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let resume = state.applications.fetch_resume(&user, &id).await?;

    let content_type = HeaderValue::from_str(&resume.content_type)
        .map_err(|_| ApiError::internal("Stored resume has an invalid content type"))?;
    let disposition = HeaderValue::from_str(&inline_disposition(&resume.original_name))
        .map_err(|_| ApiError::internal("Stored resume has an invalid file name"))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, HeaderValue::from_static("private, no-store")),
            (
                HeaderName::from_static("cross-origin-resource-policy"),
                HeaderValue::from_static("cross-origin"),
            ),
        ],
        resume.data,
    )
        .into_response())
}
