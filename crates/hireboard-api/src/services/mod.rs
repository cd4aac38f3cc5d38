//! Business logic services.

pub mod applications;
pub mod jobs;

pub use applications::{resume_url, ApplicationService, SubmitApplication};
pub use jobs::JobCatalogue;
