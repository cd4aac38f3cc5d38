use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use hireboard_models::{
    Application, ApplicationId, ApplicationStatus, Job, JobId, JobQuery, User, UserId,
};

use super::{ApplicationStore, JobStore, StoreError, StoreHealth, StoreResult, UserStore};

/// Accounts and postings preloaded into a [`MemoryStore`].
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// In-process store. State is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    jobs: RwLock<HashMap<JobId, Job>>,
    applications: RwLock<HashMap<ApplicationId, Application>>,
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: SeedData) -> Self {
        Self {
            jobs: RwLock::new(seed.jobs.into_iter().map(|j| (j.id.clone(), j)).collect()),
            applications: RwLock::new(HashMap::new()),
            users: RwLock::new(seed.users.into_iter().map(|u| (u.id.clone(), u)).collect()),
        }
    }

    /// Load seed data from a JSON file.
    pub async fn from_seed_file(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let seed: SeedData = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            users = seed.users.len(),
            jobs = seed.jobs.len(),
            "Loaded memory store seed"
        );
        Ok(Self::with_seed(seed))
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub async fn insert_job(&self, job: Job) {
        self.jobs.write().await.insert(job.id.clone(), job);
    }

    async fn list_where<F>(&self, predicate: F) -> Vec<Application>
    where
        F: Fn(&Application) -> bool,
    {
        let applications = self.applications.read().await;
        let mut matching: Vec<Application> = applications
            .values()
            .filter(|a| predicate(a))
            .map(|a| {
                let mut summary = a.clone();
                summary.resume.data = Vec::new();
                summary
            })
            .collect();
        matching.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        matching
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn list_jobs(&self, query: &JobQuery) -> StoreResult<Vec<Job>> {
        let jobs = self.jobs.read().await;
        let mut matching: Vec<Job> = jobs.values().filter(|j| query.matches(j)).cloned().collect();
        matching.sort_by(|a, b| query.sort.compare(a, b));
        Ok(query.paginate(matching))
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn create_application(&self, application: &Application) -> StoreResult<()> {
        let mut applications = self.applications.write().await;
        if applications.contains_key(&application.id) {
            return Err(StoreError::Conflict(format!("application {}", application.id)));
        }
        applications.insert(application.id.clone(), application.clone());
        Ok(())
    }

    async fn get_application(&self, id: &ApplicationId) -> StoreResult<Option<Application>> {
        Ok(self.applications.read().await.get(id).cloned())
    }

    async fn list_applications_by_employer(
        &self,
        employer: &UserId,
    ) -> StoreResult<Vec<Application>> {
        Ok(self.list_where(|a| &a.employer_id.user == employer).await)
    }

    async fn list_applications_by_applicant(
        &self,
        applicant: &UserId,
    ) -> StoreResult<Vec<Application>> {
        Ok(self.list_where(|a| &a.applicant_id.user == applicant).await)
    }

    async fn update_application_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> StoreResult<()> {
        let mut applications = self.applications.write().await;
        let application = applications
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("application {}", id)))?;
        application.status = status;
        Ok(())
    }

    async fn delete_application(&self, id: &ApplicationId) -> StoreResult<()> {
        self.applications.write().await.remove(id);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: &UserId) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
