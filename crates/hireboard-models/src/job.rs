//! Job posting models and catalogue queries.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

use crate::user::UserId;

/// Default number of jobs per catalogue page.
pub const DEFAULT_PAGE_SIZE: u32 = 8;

/// Upper bound on the catalogue page size.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Highest catalogue page a client may request. Keeps the skip count
/// within what a Firestore query offset can carry.
pub const MAX_PAGE: u32 = 100_000;

/// Unique identifier for a job posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
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

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A job posting.
///
/// Postings are managed by the job service; this backend only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: JobId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub country: String,
    #[serde(default)]
    pub city: String,
    pub salary: u64,
    /// Employer that posted the job.
    pub posted_by: UserId,
    #[serde(rename = "jobPostedOn")]
    pub posted_on: DateTime<Utc>,
    #[serde(default)]
    pub expired: bool,
}

impl Job {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        country: impl Into<String>,
        salary: u64,
        posted_by: UserId,
    ) -> Self {
        Self {
            id: JobId::new(),
            title: title.into(),
            description: String::new(),
            category: category.into(),
            country: country.into(),
            city: String::new(),
            salary,
            posted_by,
            posted_on: Utc::now(),
            expired: false,
        }
    }

    /// Whether applications can still be submitted against this job.
    pub fn is_open(&self) -> bool {
        !self.expired
    }
}

/// Catalogue ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobSort {
    #[default]
    Newest,
    Oldest,
    SalaryHigh,
    SalaryLow,
}

impl JobSort {
    /// Parse the query-string form, falling back to newest first.
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "oldest" => Self::Oldest,
            "salaryHigh" => Self::SalaryHigh,
            "salaryLow" => Self::SalaryLow,
            _ => Self::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::SalaryHigh => "salaryHigh",
            Self::SalaryLow => "salaryLow",
        }
    }

    /// Stored field the ordering applies to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Newest | Self::Oldest => "posted_on",
            Self::SalaryHigh | Self::SalaryLow => "salary",
        }
    }

    pub const fn is_descending(&self) -> bool {
        matches!(self, Self::Newest | Self::SalaryHigh)
    }

    /// Compare two jobs under this ordering.
    pub fn compare(&self, a: &Job, b: &Job) -> Ordering {
        match self {
            Self::Newest => b.posted_on.cmp(&a.posted_on),
            Self::Oldest => a.posted_on.cmp(&b.posted_on),
            Self::SalaryHigh => b.salary.cmp(&a.salary),
            Self::SalaryLow => a.salary.cmp(&b.salary),
        }
    }
}

/// A catalogue listing request after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    /// Case-insensitive title substring.
    pub keyword: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    pub sort: JobSort,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            keyword: None,
            category: None,
            sort: JobSort::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl JobQuery {
    /// Build from raw query parameters. Blank strings count as absent.
    pub fn from_params(
        keyword: Option<&str>,
        category: Option<&str>,
        sort: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Self {
        let non_blank = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            keyword: non_blank(keyword),
            category: non_blank(category),
            sort: sort.map(JobSort::from_str_or_default).unwrap_or_default(),
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of matching jobs to skip before this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }

    /// Keyword filter only.
    pub fn matches_keyword(&self, job: &Job) -> bool {
        match &self.keyword {
            Some(keyword) => job
                .title
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
            None => true,
        }
    }

    /// Full predicate: open, category and keyword.
    pub fn matches(&self, job: &Job) -> bool {
        if !job.is_open() {
            return false;
        }
        if let Some(category) = &self.category {
            if &job.category != category {
                return false;
            }
        }
        self.matches_keyword(job)
    }

    /// Cut one page out of an already filtered and ordered list.
    pub fn paginate(&self, jobs: Vec<Job>) -> Vec<Job> {
        jobs.into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect()
    }
}
