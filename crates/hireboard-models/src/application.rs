//! Job application models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::job::{Job, JobId};
use crate::role::Identity;
use crate::user::UserId;
use crate::utils::trimmed;

/// Content types accepted for resume uploads.
pub const ALLOWED_RESUME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

/// Unique identifier for an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    /// Generate a new random application ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ApplicationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ApplicationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ApplicationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Review status of an application.
///
/// The three states are flat: an employer may move an application
/// between any of them at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a status literal is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid status '{0}'. Expected one of: Pending, Accepted, Rejected.")]
pub struct ParseStatusError(pub String);

impl FromStr for ApplicationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ApplicationStatus::Pending),
            "Accepted" => Ok(ApplicationStatus::Accepted),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Stored resume file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumeArtifact {
    #[serde(with = "crate::utils::base64_bytes", default)]
    #[schemars(with = "String")]
    pub data: Vec<u8>,
    pub content_type: String,
    #[serde(default)]
    pub original_name: String,
}

impl ResumeArtifact {
    /// Whether any resume bytes are present.
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }
}

/// A resume file received from a client, independent of the transport.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

impl ResumeUpload {
    pub fn is_allowed_type(&self) -> bool {
        ALLOWED_RESUME_TYPES.contains(&self.content_type.as_str())
    }

    pub fn into_artifact(self) -> ResumeArtifact {
        ResumeArtifact {
            data: self.bytes,
            content_type: self.content_type,
            original_name: self.file_name,
        }
    }
}

/// Applicant-provided text fields of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ApplicantDetails {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 30))]
    pub phone: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(min = 1, max = 5000))]
    pub cover_letter: String,
}

impl ApplicantDetails {
    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            name: trimmed(&self.name),
            email: trimmed(&self.email),
            phone: trimmed(&self.phone),
            address: trimmed(&self.address),
            cover_letter: trimmed(&self.cover_letter),
        }
    }

    /// True if any required field is empty.
    pub fn has_blank_field(&self) -> bool {
        [
            &self.name,
            &self.email,
            &self.phone,
            &self.address,
            &self.cover_letter,
        ]
        .iter()
        .any(|f| f.is_empty())
    }
}

/// A submitted application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: ApplicationId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub cover_letter: String,
    #[serde(rename = "applicantID")]
    pub applicant_id: Identity,
    /// Poster of the job at submission time. Never re-derived.
    #[serde(rename = "employerID")]
    pub employer_id: Identity,
    pub resume: ResumeArtifact,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub job_id: JobId,
    pub applied_at: DateTime<Utc>,
}

impl Application {
    /// Build a new pending application against `job`.
    pub fn new(
        details: ApplicantDetails,
        applicant: UserId,
        job: &Job,
        resume: ResumeArtifact,
    ) -> Self {
        Self {
            id: ApplicationId::new(),
            name: details.name,
            email: details.email,
            phone: details.phone,
            address: details.address,
            cover_letter: details.cover_letter,
            applicant_id: Identity::job_seeker(applicant),
            employer_id: Identity::employer(job.posted_by.clone()),
            resume,
            status: ApplicationStatus::Pending,
            job_id: job.id.clone(),
            applied_at: Utc::now(),
        }
    }
}

/// Resume reference returned in list views. Carries no bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumeLink {
    pub content_type: String,
    pub original_name: String,
    pub url: String,
}

/// Application as presented in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(rename = "_id")]
    pub id: ApplicationId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub cover_letter: String,
    #[serde(rename = "applicantID")]
    pub applicant_id: Identity,
    #[serde(rename = "employerID")]
    pub employer_id: Identity,
    pub resume: ResumeLink,
    pub status: ApplicationStatus,
    pub job_id: JobId,
    pub applied_at: DateTime<Utc>,
}

impl ApplicationView {
    /// Drop the resume bytes and attach the fetch URL.
    pub fn from_record(app: Application, resume_url: String) -> Self {
        Self {
            id: app.id,
            name: app.name,
            email: app.email,
            phone: app.phone,
            address: app.address,
            cover_letter: app.cover_letter,
            applicant_id: app.applicant_id,
            employer_id: app.employer_id,
            resume: ResumeLink {
                content_type: app.resume.content_type,
                original_name: app.resume.original_name,
                url: resume_url,
            },
            status: app.status,
            job_id: app.job_id,
            applied_at: app.applied_at,
        }
    }
}
