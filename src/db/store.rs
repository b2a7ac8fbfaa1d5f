use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::{
    Account, Application, ApplicationStatus, Job, NewAccount, NewApplication, NewJob, Session,
};

/// Storage-level errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username '{0}' is already registered")]
    DuplicateUsername(String),

    #[error("account {applicant_id} already applied to job {job_id}")]
    DuplicateApplication { job_id: i64, applicant_id: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence boundary for accounts, sessions, jobs and applications.
///
/// Deleting an account removes its sessions, jobs and applications; deleting a
/// job removes its applications. At most one application exists per
/// (job, applicant) pair; a second insert fails with
/// [`StoreError::DuplicateApplication`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn close(&self);

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn find_account_by_username(&self, username: &str)
        -> Result<Option<Account>, StoreError>;

    async fn find_account(&self, id: i64) -> Result<Option<Account>, StoreError>;

    /// Returns whether an account was removed
    async fn delete_account(&self, id: i64) -> Result<bool, StoreError>;

    async fn create_session(
        &self,
        account_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError>;

    async fn find_session(&self, token: Uuid) -> Result<Option<Session>, StoreError>;

    async fn delete_session(&self, token: Uuid) -> Result<(), StoreError>;

    /// All jobs, newest first
    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError>;

    async fn find_job(&self, id: i64) -> Result<Option<Job>, StoreError>;

    async fn create_job(&self, job: NewJob) -> Result<Job, StoreError>;

    async fn delete_job(&self, id: i64) -> Result<bool, StoreError>;

    async fn application_exists(&self, job_id: i64, applicant_id: i64)
        -> Result<bool, StoreError>;

    async fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, StoreError>;

    /// All applications, newest first
    async fn list_applications(&self) -> Result<Vec<Application>, StoreError>;

    async fn set_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, StoreError>;
}
