//! Command-line admin console: the only place application status changes

use std::io::Write;
use std::sync::Arc;

use clap::Subcommand;
use tracing::info;

use crate::config::AdminSite;
use crate::db::models::ApplicationStatus;
use crate::db::{Store, StoreError};

#[derive(Debug, Clone, Subcommand)]
pub enum AdminCommand {
    /// List every job, newest first
    Jobs,
    /// List every application, newest first
    Applications,
    /// Change the review status of an application
    SetStatus {
        id: i64,
        /// Applied, Shortlisted or Rejected
        status: ApplicationStatus,
    },
    /// Delete a job together with its applications
    DeleteJob { id: i64 },
    /// Delete an account with its sessions, jobs and applications
    DeleteAccount { username: String },
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} not found")]
    NotFound(String),
}

pub struct AdminConsole {
    site: AdminSite,
    store: Arc<dyn Store>,
}

impl AdminConsole {
    pub fn new(site: AdminSite, store: Arc<dyn Store>) -> Self {
        Self { site, store }
    }

    fn banner<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let header = format!("{} | {}", self.site.site_header, self.site.site_title);
        writeln!(out, "{header}")?;
        writeln!(out, "{}", "=".repeat(header.chars().count()))?;
        writeln!(out, "{}", self.site.index_title)?;
        writeln!(out)
    }

    pub async fn run<W: Write>(&self, command: AdminCommand, out: &mut W) -> Result<(), AdminError> {
        self.banner(out)?;

        match command {
            AdminCommand::Jobs => {
                let jobs = self.store.list_jobs().await?;
                writeln!(out, "{} job(s)", jobs.len())?;
                for job in jobs {
                    writeln!(
                        out,
                        "#{:<5} {:<40} {:<20} by {:<15} {}",
                        job.id,
                        job.title,
                        job.location,
                        job.employer_username,
                        job.posted_display()
                    )?;
                }
            }
            AdminCommand::Applications => {
                let applications = self.store.list_applications().await?;
                writeln!(out, "{} application(s)", applications.len())?;
                for ap in applications {
                    writeln!(
                        out,
                        "#{:<5} {:<15} -> {:<40} {:<12} {} ({})",
                        ap.id,
                        ap.applicant_username,
                        ap.job_title,
                        ap.status,
                        ap.resume,
                        ap.applied_on.format("%Y-%m-%d %H:%M")
                    )?;
                }
            }
            AdminCommand::SetStatus { id, status } => {
                let application = self
                    .store
                    .set_application_status(id, status)
                    .await?
                    .ok_or_else(|| AdminError::NotFound(format!("application {id}")))?;
                info!("Admin: application {} status set to {}", id, status);
                writeln!(
                    out,
                    "Application #{} by {} for '{}' is now {}",
                    application.id, application.applicant_username, application.job_title,
                    application.status
                )?;
            }
            AdminCommand::DeleteJob { id } => {
                if !self.store.delete_job(id).await? {
                    return Err(AdminError::NotFound(format!("job {id}")));
                }
                info!("Admin: job {} deleted", id);
                writeln!(out, "Deleted job #{id} and its applications")?;
            }
            AdminCommand::DeleteAccount { username } => {
                let account = self
                    .store
                    .find_account_by_username(&username)
                    .await?
                    .ok_or_else(|| AdminError::NotFound(format!("account '{username}'")))?;
                self.store.delete_account(account.id).await?;
                info!("Admin: account {} deleted", username);
                writeln!(out, "Deleted account '{username}' with its jobs and applications")?;
            }
        }
        Ok(())
    }
}
