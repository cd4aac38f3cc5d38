//! Shared data models for the Hireboard backend.
//!
//! This crate provides Serde-serializable types for:
//! - Users and their roles
//! - Job postings and catalogue queries
//! - Applications, resume artifacts and review status

pub mod application;
pub mod job;
pub mod role;
pub mod user;
pub mod utils;

// Re-export common types
pub use application::{
    ApplicantDetails, Application, ApplicationId, ApplicationStatus, ApplicationView,
    ParseStatusError, ResumeArtifact, ResumeLink, ResumeUpload, ALLOWED_RESUME_TYPES,
};
pub use job::{Job, JobId, JobQuery, JobSort, DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE};
pub use role::{Identity, Role};
pub use user::{User, UserId};
