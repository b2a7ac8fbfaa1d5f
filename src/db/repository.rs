use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use super::models::{
    Account, Application, ApplicationStatus, Job, NewAccount, NewApplication, NewJob, Session,
};
use super::store::{Store, StoreError};

const USERNAME_CONSTRAINT: &str = "accounts_username_key";
const APPLICATION_CONSTRAINT: &str = "applications_job_applicant_key";

const JOB_COLUMNS: &str = r#"
    j.id, j.employer_id, a.username AS employer_username,
    j.title, j.description, j.location, j.posted_on
"#;

const APPLICATION_COLUMNS: &str = r#"
    ap.id, ap.job_id, j.title AS job_title, ap.applicant_id,
    a.username AS applicant_username, ap.resume, ap.status, ap.applied_on
"#;

fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Repository for job-board records in PostgreSQL
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        debug!("Creating account: username={}", account.username);

        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, joined_on
            "#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err, USERNAME_CONSTRAINT) {
                StoreError::DuplicateUsername(account.username.clone())
            } else {
                StoreError::Database(err)
            }
        })
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, username, email, password_hash, joined_on FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn find_account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, username, email, password_hash, joined_on FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn delete_account(&self, id: i64) -> Result<bool, StoreError> {
        debug!("Deleting account id={}", id);
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_session(
        &self,
        account_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, account_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token, account_id, created_at, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        debug!("Session created for account id={}", account_id);
        Ok(session)
    }

    async fn find_session(&self, token: Uuid) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT token, account_id, created_at, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let query = format!(
            "SELECT {JOB_COLUMNS} FROM jobs j JOIN accounts a ON a.id = j.employer_id \
             ORDER BY j.posted_on DESC, j.id DESC"
        );
        let jobs = sqlx::query_as::<_, Job>(&query)
            .fetch_all(&self.pool)
            .await?;

        debug!("Loaded {} jobs", jobs.len());
        Ok(jobs)
    }

    async fn find_job(&self, id: i64) -> Result<Option<Job>, StoreError> {
        let query = format!(
            "SELECT {JOB_COLUMNS} FROM jobs j JOIN accounts a ON a.id = j.employer_id WHERE j.id = $1"
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, StoreError> {
        debug!("Creating job: title={}, employer_id={}", job.title, job.employer_id);

        let query = format!(
            r#"
            WITH j AS (
                INSERT INTO jobs (employer_id, title, description, location)
                VALUES ($1, $2, $3, $4)
                RETURNING id, employer_id, title, description, location, posted_on
            )
            SELECT {JOB_COLUMNS} FROM j JOIN accounts a ON a.id = j.employer_id
            "#
        );
        let row = sqlx::query_as::<_, Job>(&query)
            .bind(job.employer_id)
            .bind(&job.title)
            .bind(&job.description)
            .bind(&job.location)
            .fetch_one(&self.pool)
            .await?;

        debug!("Job created with id={}", row.id);
        Ok(row)
    }

    async fn delete_job(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn application_exists(
        &self,
        job_id: i64,
        applicant_id: i64,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM applications WHERE job_id = $1 AND applicant_id = $2)",
        )
        .bind(job_id)
        .bind(applicant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_application(
        &self,
        application: NewApplication,
    ) -> Result<Application, StoreError> {
        debug!(
            "Creating application: job_id={}, applicant_id={}",
            application.job_id, application.applicant_id
        );

        let query = format!(
            r#"
            WITH ap AS (
                INSERT INTO applications (job_id, applicant_id, resume)
                VALUES ($1, $2, $3)
                RETURNING id, job_id, applicant_id, resume, status, applied_on
            )
            SELECT {APPLICATION_COLUMNS} FROM ap
            JOIN jobs j ON j.id = ap.job_id
            JOIN accounts a ON a.id = ap.applicant_id
            "#
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(application.job_id)
            .bind(application.applicant_id)
            .bind(&application.resume)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, APPLICATION_CONSTRAINT) {
                    StoreError::DuplicateApplication {
                        job_id: application.job_id,
                        applicant_id: application.applicant_id,
                    }
                } else {
                    StoreError::Database(err)
                }
            })
    }

    async fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        let query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications ap \
             JOIN jobs j ON j.id = ap.job_id \
             JOIN accounts a ON a.id = ap.applicant_id \
             ORDER BY ap.applied_on DESC, ap.id DESC"
        );
        let applications = sqlx::query_as::<_, Application>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(applications)
    }

    async fn set_application_status(
        &self,
        id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, StoreError> {
        debug!("Setting application {} status to {}", id, status);

        let query = format!(
            r#"
            WITH ap AS (
                UPDATE applications SET status = $2 WHERE id = $1
                RETURNING id, job_id, applicant_id, resume, status, applied_on
            )
            SELECT {APPLICATION_COLUMNS} FROM ap
            JOIN jobs j ON j.id = ap.job_id
            JOIN accounts a ON a.id = ap.applicant_id
            "#
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(application)
    }
}
