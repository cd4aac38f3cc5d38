//! Persistence seam for the API.
//!
//! Handlers and services only see these traits. `firestore` backs them with
//! the Firestore repositories; `memory` keeps everything in process for
//! development and tests.

mod firestore;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use hireboard_firestore::FirestoreError;
use hireboard_models::{
    Application, ApplicationId, ApplicationStatus, Job, JobId, JobQuery, User, UserId,
};

pub use firestore::FirestoreStore;
pub use memory::{MemoryStore, SeedData};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Firestore(FirestoreError),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<FirestoreError> for StoreError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::NotFound(msg) => Self::NotFound(msg),
            FirestoreError::AlreadyExists(msg) => Self::Conflict(msg),
            other => Self::Firestore(other),
        }
    }
}

/// Read access to job postings.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>>;

    /// One page of open jobs matching `query`, in the query's order.
    async fn list_jobs(&self, query: &JobQuery) -> StoreResult<Vec<Job>>;
}

/// Application records.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn create_application(&self, application: &Application) -> StoreResult<()>;

    /// Full record, resume bytes included.
    async fn get_application(&self, id: &ApplicationId) -> StoreResult<Option<Application>>;

    /// Newest first, resume bytes left empty.
    async fn list_applications_by_employer(
        &self,
        employer: &UserId,
    ) -> StoreResult<Vec<Application>>;

    /// Newest first, resume bytes left empty.
    async fn list_applications_by_applicant(
        &self,
        applicant: &UserId,
    ) -> StoreResult<Vec<Application>>;

    /// `NotFound` if the record no longer exists.
    async fn update_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> StoreResult<()>;

    async fn delete_application(&self, id: &ApplicationId) -> StoreResult<()>;
}

/// Read access to accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: &UserId) -> StoreResult<Option<User>>;
}

/// Readiness probe for the backend.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;
}

/// The store handles shared through application state.
#[derive(Clone)]
pub struct Stores {
    pub jobs: Arc<dyn JobStore>,
    pub applications: Arc<dyn ApplicationStore>,
    pub users: Arc<dyn UserStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    /// Use a single backend for every concern.
    pub fn from_backend<S>(store: Arc<S>) -> Self
    where
        S: JobStore + ApplicationStore + UserStore + StoreHealth + 'static,
    {
        Self {
            jobs: store.clone(),
            applications: store.clone(),
            users: store.clone(),
            health: store,
        }
    }
}
