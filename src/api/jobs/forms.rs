use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use super::service::ResumeUpload;
use crate::api::validation::{first_message, non_blank};

pub const JOB_POSTED: &str = "Job posted successfully!";
pub const LISTING_FAILED: &str = "Error loading jobs. Please try again later.";
pub const RESUME_REQUIRED: &str = "Please upload a resume.";
pub const ALREADY_APPLIED: &str = "You have already applied for this job.";
pub const APPLICATION_SUBMITTED: &str = "Application submitted successfully!";

/// Job posting form
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PostJobForm {
    #[validate(
        custom(function = "non_blank"),
        length(max = 100, message = "Title must be at most 100 characters.")
    )]
    pub title: String,
    #[validate(custom(function = "non_blank"))]
    pub description: String,
    #[validate(
        custom(function = "non_blank"),
        length(max = 100, message = "Location must be at most 100 characters.")
    )]
    pub location: String,
}

impl PostJobForm {
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
        }
    }

    pub fn check(&self) -> Result<(), String> {
        self.validate()
            .map_err(|errors| first_message(&errors, &["title", "description", "location"]))
    }
}

/// Multipart body of the apply form
#[derive(Debug, MultipartForm)]
pub struct ApplyForm {
    pub resume: Option<TempFile>,
}

impl<'a> From<&'a TempFile> for ResumeUpload<'a> {
    fn from(file: &'a TempFile) -> Self {
        ResumeUpload {
            path: file.file.path(),
            file_name: file.file_name.as_deref().unwrap_or_default(),
            size: file.size,
        }
    }
}
