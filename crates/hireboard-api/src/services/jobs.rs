//! Read-only job catalogue.

use hireboard_models::{Job, JobId, JobQuery};

use crate::access::{self, Operation};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::security::is_valid_document_id;
use crate::store::Stores;

#[derive(Clone)]
pub struct JobCatalogue {
    stores: Stores,
}

impl JobCatalogue {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// One page of open jobs.
    pub async fn list(&self, user: &AuthUser, query: &JobQuery) -> ApiResult<Vec<Job>> {
        access::authorize(Operation::BrowseJobs, user)?;
        Ok(self.stores.jobs.list_jobs(query).await?)
    }

    /// A single job. Expired jobs are still returned so that existing
    /// applications can show what they were for.
    pub async fn get(&self, user: &AuthUser, id: &str) -> ApiResult<Job> {
        access::authorize(Operation::BrowseJobs, user)?;
        if !is_valid_document_id(id) {
            return Err(ApiError::not_found("Job not found!"));
        }
        self.stores
            .jobs
            .get_job(&JobId::from(id))
            .await?
            .ok_or_else(|| ApiError::not_found("Job not found!"))
    }
}
