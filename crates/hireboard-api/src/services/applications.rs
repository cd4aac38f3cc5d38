//! Application lifecycle: submission, listing, resume retrieval, withdrawal
//! and review.
//!
//! Every operation checks the caller's role first, then existence, then
//! ownership. Messages returned here are shown to end users as-is.

use tracing::{debug, info};
use validator::{Validate, ValidationErrors};

use hireboard_models::{
    ApplicantDetails, Application, ApplicationId, ApplicationStatus, ApplicationView, JobId,
    ResumeArtifact, ResumeUpload,
};

use crate::access::{self, Operation};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::security::is_valid_document_id;
use crate::store::Stores;

const RESUME_REQUIRED: &str = "Resume File Required!";
const INVALID_RESUME_TYPE: &str = "Invalid file type. Please upload a PNG, JPEG or WEBP file.";
const JOB_NOT_FOUND: &str = "Job not found!";
const FILL_ALL_FIELDS: &str = "Please fill all fields.";
const APPLICATION_NOT_FOUND: &str = "Application not found!";
const RESUME_NOT_FOUND: &str = "Resume not found!";
const STATUS_REQUIRED: &str = "Please provide a status.";

/// A submission as received from the transport.
#[derive(Debug, Clone, Default)]
pub struct SubmitApplication {
    pub job_id: Option<String>,
    pub details: ApplicantDetails,
    pub resume: Option<ResumeUpload>,
}

/// Link under which a stored resume is served.
pub fn resume_url(base_url: &str, id: &ApplicationId) -> String {
    format!(
        "{}/api/v1/application/resume/{}",
        base_url.trim_end_matches('/'),
        id
    )
}

/// Turn validator output into a single user-facing sentence.
fn describe_invalid_fields(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors
        .keys()
        .map(|field| match &**field {
            "cover_letter" => "cover letter",
            other => other,
        })
        .collect();
    fields.sort_unstable();
    format!("Please provide a valid {}.", fields.join(", "))
}

/// Application lifecycle service.
#[derive(Clone)]
pub struct ApplicationService {
    stores: Stores,
    resume_max_bytes: usize,
}

impl ApplicationService {
    pub fn new(stores: Stores, resume_max_bytes: usize) -> Self {
        Self {
            stores,
            resume_max_bytes,
        }
    }

    fn check_resume(&self, resume: Option<ResumeUpload>) -> ApiResult<ResumeUpload> {
        let resume = resume.ok_or_else(|| ApiError::validation(RESUME_REQUIRED))?;
        if !resume.is_allowed_type() {
            return Err(ApiError::validation(INVALID_RESUME_TYPE));
        }
        if resume.bytes.is_empty() {
            return Err(ApiError::validation(RESUME_REQUIRED));
        }
        if resume.bytes.len() > self.resume_max_bytes {
            return Err(ApiError::validation(format!(
                "Resume file is too large. Maximum size is {} bytes.",
                self.resume_max_bytes
            )));
        }
        Ok(resume)
    }

    async fn load(&self, id: &str) -> ApiResult<Application> {
        if !is_valid_document_id(id) {
            return Err(ApiError::not_found(APPLICATION_NOT_FOUND));
        }
        self.stores
            .applications
            .get_application(&ApplicationId::from(id))
            .await?
            .ok_or_else(|| ApiError::not_found(APPLICATION_NOT_FOUND))
    }

    /// Submit an application for an open job. Job seekers only.
    pub async fn submit(&self, user: &AuthUser, input: SubmitApplication) -> ApiResult<Application> {
        access::authorize(Operation::SubmitApplication, user)?;

        let resume = self.check_resume(input.resume)?;

        let job_id = input
            .job_id
            .as_deref()
            .map(str::trim)
            .filter(|id| is_valid_document_id(id))
            .ok_or_else(|| ApiError::not_found(JOB_NOT_FOUND))?;
        let job = self
            .stores
            .jobs
            .get_job(&JobId::from(job_id))
            .await?
            .filter(|job| job.is_open())
            .ok_or_else(|| ApiError::not_found(JOB_NOT_FOUND))?;

        let details = input.details.trimmed();
        if details.has_blank_field() {
            return Err(ApiError::validation(FILL_ALL_FIELDS));
        }
        details
            .validate()
            .map_err(|e| ApiError::validation(describe_invalid_fields(&e)))?;

        let resume_size = resume.bytes.len();
        let content_type = resume.content_type.clone();
        let application = Application::new(details, user.id.clone(), &job, resume.into_artifact());
        self.stores.applications.create_application(&application).await?;

        metrics::record_application_submitted(&content_type, resume_size);
        info!(
            application_id = %application.id,
            job_id = %application.job_id,
            applicant = %user.id,
            employer = %application.employer_id.user,
            "Application submitted"
        );
        Ok(application)
    }

    /// Stored resume bytes. Either party to the application may read them.
    pub async fn fetch_resume(&self, user: &AuthUser, id: &str) -> ApiResult<ResumeArtifact> {
        access::authorize(Operation::FetchResume, user)?;

        let application = self.load(id).await?;
        access::ensure_party(Operation::FetchResume, user, &application)?;

        if !application.resume.has_data() {
            return Err(ApiError::not_found(RESUME_NOT_FOUND));
        }
        debug!(application_id = %application.id, "Serving resume");
        Ok(application.resume)
    }

    /// Applications received by the calling employer, newest first.
    pub async fn list_for_employer(
        &self,
        user: &AuthUser,
        base_url: &str,
    ) -> ApiResult<Vec<ApplicationView>> {
        access::authorize(Operation::ListEmployerApplications, user)?;

        let applications = self
            .stores
            .applications
            .list_applications_by_employer(&user.id)
            .await?;
        Ok(to_views(applications, base_url))
    }

    /// Applications submitted by the calling job seeker, newest first.
    pub async fn list_for_job_seeker(
        &self,
        user: &AuthUser,
        base_url: &str,
    ) -> ApiResult<Vec<ApplicationView>> {
        access::authorize(Operation::ListOwnApplications, user)?;

        let applications = self
            .stores
            .applications
            .list_applications_by_applicant(&user.id)
            .await?;
        Ok(to_views(applications, base_url))
    }

    /// Withdraw one of the caller's own applications.
    pub async fn delete(&self, user: &AuthUser, id: &str) -> ApiResult<()> {
        access::authorize(Operation::DeleteApplication, user)?;

        let application = self.load(id).await?;
        access::ensure_applicant(Operation::DeleteApplication, user, &application)?;

        self.stores
            .applications
            .delete_application(&application.id)
            .await?;

        metrics::record_application_deleted();
        info!(application_id = %application.id, applicant = %user.id, "Application deleted");
        Ok(())
    }

    /// Set the review status. Any status may follow any other; the last
    /// write wins.
    pub async fn update_status(
        &self,
        user: &AuthUser,
        id: &str,
        status: Option<&str>,
    ) -> ApiResult<ApplicationStatus> {
        access::authorize(Operation::UpdateApplicationStatus, user)?;

        let raw = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::validation(STATUS_REQUIRED))?;
        let status: ApplicationStatus = raw
            .parse()
            .map_err(|e: hireboard_models::ParseStatusError| ApiError::validation(e.to_string()))?;

        let application = self.load(id).await?;
        access::ensure_employer(Operation::UpdateApplicationStatus, user, &application)?;

        self.stores
            .applications
            .update_application_status(&application.id, status)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ApiError::not_found(APPLICATION_NOT_FOUND)
                } else {
                    ApiError::from(e)
                }
            })?;

        metrics::record_status_update(status.as_str());
        info!(
            application_id = %application.id,
            from = %application.status,
            to = %status,
            "Application status updated"
        );
        Ok(status)
    }
}

fn to_views(applications: Vec<Application>, base_url: &str) -> Vec<ApplicationView> {
    applications
        .into_iter()
        .map(|app| {
            let url = resume_url(base_url, &app.id);
            ApplicationView::from_record(app, url)
        })
        .collect()
}
