//! Role and ownership rules for application operations.

use tracing::warn;

use hireboard_models::{Application, Role};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;

const NOT_A_PARTY: &str = "You are not allowed to access this application.";

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SubmitApplication,
    FetchResume,
    ListEmployerApplications,
    ListOwnApplications,
    DeleteApplication,
    UpdateApplicationStatus,
    BrowseJobs,
}

impl Operation {
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::SubmitApplication | Self::ListOwnApplications | Self::DeleteApplication => {
                &[Role::JobSeeker]
            }
            Self::ListEmployerApplications | Self::UpdateApplicationStatus => &[Role::Employer],
            Self::FetchResume | Self::BrowseJobs => &[Role::Employer, Role::JobSeeker],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SubmitApplication => "submit_application",
            Self::FetchResume => "fetch_resume",
            Self::ListEmployerApplications => "list_employer_applications",
            Self::ListOwnApplications => "list_own_applications",
            Self::DeleteApplication => "delete_application",
            Self::UpdateApplicationStatus => "update_application_status",
            Self::BrowseJobs => "browse_jobs",
        }
    }
}

fn deny(operation: Operation, user: &AuthUser, message: String) -> ApiError {
    warn!(
        user_id = %user.id,
        role = %user.role,
        operation = operation.as_str(),
        "Access denied"
    );
    metrics::record_access_denied(operation.as_str());
    ApiError::forbidden(message)
}

/// Fail with `Forbidden` unless the caller's role may perform `operation`.
pub fn authorize(operation: Operation, user: &AuthUser) -> ApiResult<()> {
    if operation.allowed_roles().contains(&user.role) {
        return Ok(());
    }
    Err(deny(
        operation,
        user,
        format!("{} not allowed to access this resource.", user.role),
    ))
}

/// Caller must be the applicant recorded on the application.
pub fn ensure_applicant(operation: Operation, user: &AuthUser, app: &Application) -> ApiResult<()> {
    if app.applicant_id.user == user.id {
        Ok(())
    } else {
        Err(deny(operation, user, NOT_A_PARTY.to_string()))
    }
}

/// Caller must be the employer snapshotted on the application.
pub fn ensure_employer(operation: Operation, user: &AuthUser, app: &Application) -> ApiResult<()> {
    if app.employer_id.user == user.id {
        Ok(())
    } else {
        Err(deny(operation, user, NOT_A_PARTY.to_string()))
    }
}

/// Caller must be either party to the application.
pub fn ensure_party(operation: Operation, user: &AuthUser, app: &Application) -> ApiResult<()> {
    if app.applicant_id.user == user.id || app.employer_id.user == user.id {
        Ok(())
    } else {
        Err(deny(operation, user, NOT_A_PARTY.to_string()))
    }
}
