use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::models::{
    Account, Application, ApplicationStatus, Job, NewAccount, NewApplication, NewJob, Session,
};
use super::store::{Store, StoreError};

#[derive(Default)]
struct Tables {
    next_id: i64,
    accounts: Vec<Account>,
    sessions: Vec<Session>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username_of(&self, account_id: i64) -> String {
        self.accounts
            .iter()
            .find(|a| a.id == account_id)
            .map(|a| a.username.clone())
            .unwrap_or_default()
    }
}

/// Process-local store for development runs (`serve --in-memory`) and tests.
/// Mirrors the cascade and uniqueness rules of the PostgreSQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.accounts.iter().any(|a| a.username == account.username) {
            return Err(StoreError::DuplicateUsername(account.username));
        }
        let row = Account {
            id: tables.next_id(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            joined_on: Utc::now(),
        };
        tables.accounts.push(row.clone());
        Ok(row)
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn find_account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn delete_account(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.accounts.len();
        tables.accounts.retain(|a| a.id != id);
        if tables.accounts.len() == before {
            return Ok(false);
        }

        tables.sessions.retain(|s| s.account_id != id);
        let owned_jobs: Vec<i64> = tables
            .jobs
            .iter()
            .filter(|j| j.employer_id == id)
            .map(|j| j.id)
            .collect();
        tables.jobs.retain(|j| j.employer_id != id);
        tables
            .applications
            .retain(|ap| ap.applicant_id != id && !owned_jobs.contains(&ap.job_id));
        Ok(true)
    }

    async fn create_session(
        &self,
        account_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let mut tables = self.tables.lock().await;
        let session = Session {
            token: Uuid::new_v4(),
            account_id,
            created_at: Utc::now(),
            expires_at,
        };
        tables.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session(&self, token: Uuid) -> Result<Option<Session>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.sessions.iter().find(|s| s.token == token).cloned())
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.sessions.retain(|s| s.token != token);
        Ok(())
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let tables = self.tables.lock().await;
        let mut jobs = tables.jobs.clone();
        jobs.sort_by(|a, b| b.posted_on.cmp(&a.posted_on).then(b.id.cmp(&a.id)));
        Ok(jobs)
    }

    async fn find_job(&self, id: i64) -> Result<Option<Job>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, StoreError> {
        let mut tables = self.tables.lock().await;
        let row = Job {
            id: tables.next_id(),
            employer_username: tables.username_of(job.employer_id),
            employer_id: job.employer_id,
            title: job.title,
            description: job.description,
            location: job.location,
            posted_on: Utc::now(),
        };
        tables.jobs.push(row.clone());
        Ok(row)
    }

    async fn delete_job(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.jobs.len();
        tables.jobs.retain(|j| j.id != id);
        tables.applications.retain(|ap| ap.job_id != id);
        Ok(tables.jobs.len() < before)
    }

    async fn application_exists(
        &self,
        job_id: i64,
        applicant_id: i64,
    ) -> Result<bool, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .applications
            .iter()
            .any(|ap| ap.job_id == job_id && ap.applicant_id == applicant_id))
    }

    async fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, StoreError> {
        let mut tables = self.tables.lock().await;
        let duplicate = tables
            .applications
            .iter()
            .any(|ap| ap.job_id == application.job_id && ap.applicant_id == application.applicant_id);
        if duplicate {
            return Err(StoreError::DuplicateApplication {
                job_id: application.job_id,
                applicant_id: application.applicant_id,
            });
        }

        let job_title = tables
            .jobs
            .iter()
            .find(|j| j.id == application.job_id)
            .map(|j| j.title.clone())
            .unwrap_or_default();
        let row = Application {
            id: tables.next_id(),
            job_id: application.job_id,
            job_title,
            applicant_id: application.applicant_id,
            applicant_username: tables.username_of(application.applicant_id),
            resume: application.resume,
            status: ApplicationStatus::Applied,
            applied_on: Utc::now(),
        };
        tables.applications.push(row.clone());
        Ok(row)
    }

    async fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        let tables = self.tables.lock().await;
        let mut applications = tables.applications.clone();
        applications.sort_by(|a, b| b.applied_on.cmp(&a.applied_on).then(b.id.cmp(&a.id)));
        Ok(applications)
    }

    async fn set_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, StoreError> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .applications
            .iter_mut()
            .find(|ap| ap.id == id)
            .map(|ap| {
                ap.status = status;
                ap.clone()
            }))
    }
}
