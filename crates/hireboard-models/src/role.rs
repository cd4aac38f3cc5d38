//! Account roles and role-tagged identities.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::user::UserId;

/// Role of an account. Every user is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Role {
    #[serde(rename = "Employer")]
    Employer,
    #[serde(rename = "Job Seeker")]
    JobSeeker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employer => "Employer",
            Role::JobSeeker => "Job Seeker",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Employer" => Some(Role::Employer),
            "Job Seeker" => Some(Role::JobSeeker),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user reference tagged with the role it acted in.
///
/// Applications carry two of these: the applicant and the employer
/// that posted the job at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Identity {
    pub user: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user: UserId, role: Role) -> Self {
        Self { user, role }
    }

    pub fn employer(user: UserId) -> Self {
        Self::new(user, Role::Employer)
    }

    pub fn job_seeker(user: UserId) -> Self {
        Self::new(user, Role::JobSeeker)
    }
}
