use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered identity. Owns jobs and applications.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub joined_on: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Server-side record behind the `session_id` cookie
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token: Uuid,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Database representation of a job listing, joined with its employer's username
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: i64,
    pub employer_id: i64,
    pub employer_username: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub posted_on: DateTime<Utc>,
}

impl Job {
    pub fn posted_display(&self) -> String {
        self.posted_on.format("%b %d, %Y %H:%M UTC").to_string()
    }
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub employer_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
}

/// Review state of an application. Only the admin console changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Shortlisted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown application status '{0}' (expected Applied, Shortlisted or Rejected)")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "applied" => Ok(ApplicationStatus::Applied),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// An applicant's submission against a job
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub job_title: String,
    pub applicant_id: i64,
    pub applicant_username: String,
    /// Path relative to the media root, e.g. `resumes/cv.pdf`
    pub resume: String,
    pub status: ApplicationStatus,
    pub applied_on: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: i64,
    pub applicant_id: i64,
    pub resume: String,
}
