//! Job catalogue handlers.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use hireboard_models::{Job, JobQuery};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Raw listing parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListJobsParams {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListJobsParams {
    fn into_query(self) -> JobQuery {
        JobQuery::from_params(
            self.keyword.as_deref(),
            self.category.as_deref(),
            self.sort.as_deref(),
            self.page,
            self.limit,
        )
    }
}

#[derive(Serialize)]
pub struct JobsResponse {
    pub success: bool,
    pub jobs: Vec<Job>,
    pub page: u32,
    pub limit: u32,
}

#[derive(Serialize)]
pub struct JobResponse {
    pub success: bool,
    pub job: Job,
}

/// List open jobs.
pub async fn get_all_jobs(
    State(state): State<AppState>,
    user: AuthUser,
    params: Result<Query<ListJobsParams>, QueryRejection>,
) -> ApiResult<Json<JobsResponse>> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let query = params.into_query();
    let jobs = state.jobs.list(&user, &query).await?;

    Ok(Json(JobsResponse {
        success: true,
        jobs,
        page: query.page,
        limit: query.limit,
    }))
}

/// Get one job.
pub async fn get_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let job = state.jobs.get(&user, &id).await?;
    Ok(Json(JobResponse { success: true, job }))
}
