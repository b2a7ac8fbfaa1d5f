use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::forms::PostJobForm;
use crate::api::error::ServiceError;
use crate::db::models::{Account, Application, Job, NewApplication, NewJob};
use crate::db::{Store, StoreError};
use crate::media::MediaStorage;

/// A file received with the apply form, still in its temporary location
#[derive(Debug, Clone, Copy)]
pub struct ResumeUpload<'a> {
    pub path: &'a Path,
    pub file_name: &'a str,
    pub size: usize,
}

impl ResumeUpload<'_> {
    /// Browsers send an empty, nameless part when no file was chosen
    pub fn is_present(&self) -> bool {
        !self.file_name.trim().is_empty() && self.size > 0
    }
}

#[derive(Debug)]
pub enum ApplyOutcome {
    Submitted(Application),
    MissingResume,
    AlreadyApplied,
}

/// Job service containing business logic
pub struct JobService {
    store: Arc<dyn Store>,
    media: MediaStorage,
}

impl JobService {
    pub fn new(store: Arc<dyn Store>, media: MediaStorage) -> Self {
        Self { store, media }
    }

    /// All jobs, newest first
    pub async fn listing(&self) -> Result<Vec<Job>, StoreError> {
        self.store.list_jobs().await
    }

    pub async fn find_job(&self, id: i64) -> Result<Job, ServiceError> {
        self.store
            .find_job(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("job {id}")))
    }

    /// Create a job owned by `employer`. The form must already be trimmed and checked.
    pub async fn post_job(&self, employer: &Account, form: &PostJobForm) -> Result<Job, ServiceError> {
        info!("Service: Creating job title={} for employer={}", form.title, employer.username);

        let job = self
            .store
            .create_job(NewJob {
                employer_id: employer.id,
                title: form.title.clone(),
                description: form.description.clone(),
                location: form.location.clone(),
            })
            .await?;

        info!("Service: Job created successfully with id={}", job.id);
        Ok(job)
    }

    /// Submit an application for `applicant`
    ///
    /// # Business Logic
    /// - Requires a non-empty resume file
    /// - Refuses a second application for the same (job, applicant) pair
    /// - Stores the resume, then records the application with status Applied
    /// - A duplicate detected by the store (concurrent submit) counts as already applied
    pub async fn apply(
        &self,
        job: &Job,
        applicant: &Account,
        resume: Option<ResumeUpload<'_>>,
    ) -> Result<ApplyOutcome, ServiceError> {
        let Some(resume) = resume.filter(ResumeUpload::is_present) else {
            warn!("Service: Application for job {} by {} has no resume", job.id, applicant.username);
            return Ok(ApplyOutcome::MissingResume);
        };

        if self.store.application_exists(job.id, applicant.id).await? {
            warn!("Service: {} already applied to job {}", applicant.username, job.id);
            return Ok(ApplyOutcome::AlreadyApplied);
        }

        let stored = self.media.save_resume(resume.path, resume.file_name).await?;

        let result = self
            .store
            .create_application(NewApplication {
                job_id: job.id,
                applicant_id: applicant.id,
                resume: stored.clone(),
            })
            .await;

        match result {
            Ok(application) => {
                info!(
                    "Service: Application {} submitted for job {} by {}",
                    application.id, job.id, applicant.username
                );
                Ok(ApplyOutcome::Submitted(application))
            }
            Err(err) => {
                if let Err(cleanup) = self.media.remove(&stored).await {
                    error!("Service: Failed to remove orphaned resume {}: {}", stored, cleanup);
                }
                match err {
                    StoreError::DuplicateApplication { .. } => {
                        warn!("Service: Concurrent duplicate application for job {}", job.id);
                        Ok(ApplyOutcome::AlreadyApplied)
                    }
                    other => Err(other.into()),
                }
            }
        }
    }
}
