use async_trait::async_trait;

use hireboard_firestore::{
    ApplicationRepository, FirestoreClient, JobRepository, UserRepository,
};
use hireboard_models::{
    Application, ApplicationId, ApplicationStatus, Job, JobId, JobQuery, User, UserId,
};

use super::{ApplicationStore, JobStore, StoreHealth, StoreResult, UserStore};

/// Collection used by the readiness probe. The document never exists.
const HEALTH_COLLECTION: &str = "_health";

/// Firestore-backed store.
pub struct FirestoreStore {
    client: FirestoreClient,
    jobs: JobRepository,
    applications: ApplicationRepository,
    users: UserRepository,
}

impl FirestoreStore {
    pub fn new(client: FirestoreClient) -> Self {
        Self {
            jobs: JobRepository::new(client.clone()),
            applications: ApplicationRepository::new(client.clone()),
            users: UserRepository::new(client.clone()),
            client,
        }
    }

    /// Connect using `FirestoreConfig::from_env`.
    pub async fn from_env() -> StoreResult<Self> {
        Ok(Self::new(FirestoreClient::from_env().await?))
    }
}

#[async_trait]
impl JobStore for FirestoreStore {
    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.jobs.get(id).await?)
    }

    async fn list_jobs(&self, query: &JobQuery) -> StoreResult<Vec<Job>> {
        Ok(self.jobs.list(query).await?)
    }
}

#[async_trait]
impl ApplicationStore for FirestoreStore {
    async fn create_application(&self, application: &Application) -> StoreResult<()> {
        Ok(self.applications.create(application).await?)
    }

    async fn get_application(&self, id: &ApplicationId) -> StoreResult<Option<Application>> {
        Ok(self.applications.get(id).await?)
    }

    async fn list_applications_by_employer(
        &self,
        employer: &UserId,
    ) -> StoreResult<Vec<Application>> {
        Ok(self.applications.list_by_employer(employer).await?)
    }

    async fn list_applications_by_applicant(
        &self,
        applicant: &UserId,
    ) -> StoreResult<Vec<Application>> {
        Ok(self.applications.list_by_applicant(applicant).await?)
    }

    async fn update_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> StoreResult<()> {
        Ok(self.applications.update_status(id, status).await?)
    }

    async fn delete_application(&self, id: &ApplicationId) -> StoreResult<()> {
        Ok(self.applications.delete(id).await?)
    }
}

#[async_trait]
impl UserStore for FirestoreStore {
    async fn get_user(&self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.users.get(id).await?)
    }
}

#[async_trait]
impl StoreHealth for FirestoreStore {
    fn backend_name(&self) -> &'static str {
        "firestore"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client.get_document(HEALTH_COLLECTION, "ping").await?;
        Ok(())
    }
}
