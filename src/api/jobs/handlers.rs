use actix_multipart::form::MultipartForm;
use actix_web::{
    HttpMessage, HttpRequest, HttpResponse, get, post,
    web::{Data, Form, Path, ServiceConfig},
};
use tracing::{debug, error, warn};

use super::forms::{
    ALREADY_APPLIED, APPLICATION_SUBMITTED, ApplyForm, JOB_POSTED, LISTING_FAILED, PostJobForm,
    RESUME_REQUIRED,
};
use super::service::{ApplyOutcome, ResumeUpload};
use crate::api::error::ServiceError;
use crate::api::flash::Message;
use crate::api::pages::{
    ApplyJobPage, HomePage, Layout, PostJobPage, login_redirect, redirect_with, render,
};
use crate::api::state::AppState;
use crate::auth::CurrentAccount;

/// Listing never fails the page: a store error shows an empty list and a notice
#[get("/")]
async fn list_jobs(
    req: HttpRequest,
    state: Data<AppState>,
    current: CurrentAccount,
) -> Result<HttpResponse, ServiceError> {
    let mut layout = Layout::for_request(&req, &current);

    let jobs = match state.jobs.listing().await {
        Ok(jobs) => jobs,
        Err(err) => {
            error!("Failed to load jobs: {:?}", err);
            layout = layout.with(Message::error(LISTING_FAILED));
            Vec::new()
        }
    };

    render(&HomePage { layout, jobs })
}

#[get("/post/")]
async fn post_job_form(
    req: HttpRequest,
    current: CurrentAccount,
) -> Result<HttpResponse, ServiceError> {
    if current.0.is_none() {
        return Ok(login_redirect("/post/"));
    }

    render(&PostJobPage {
        layout: Layout::for_request(&req, &current),
        ..Default::default()
    })
}

#[post("/post/")]
async fn post_job(
    req: HttpRequest,
    state: Data<AppState>,
    current: CurrentAccount,
    form: Result<Form<PostJobForm>, actix_web::Error>,
) -> Result<HttpResponse, ServiceError> {
    let Some(employer) = current.0.as_ref() else {
        warn!("Unauthenticated job post redirected to login");
        return Ok(login_redirect("/post/"));
    };
    let form = form.map_err(ServiceError::Payload)?.into_inner().trimmed();

    if let Err(message) = form.check() {
        warn!("Job post rejected: {}", message);
        return render(&PostJobPage {
            layout: Layout::for_request(&req, &current).with(Message::error(message)),
            title: form.title,
            description: form.description,
            location: form.location,
        });
    }

    state.jobs.post_job(employer, &form).await?;
    redirect_with("/", Message::success(JOB_POSTED), state.secure_cookies)
}

#[get("/apply/{job_id}/")]
async fn apply_form(
    req: HttpRequest,
    state: Data<AppState>,
    current: CurrentAccount,
    path: Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let job = state.jobs.find_job(path.into_inner()).await?;
    if current.0.is_none() {
        return Ok(login_redirect(&format!("/apply/{}/", job.id)));
    }

    render(&ApplyJobPage {
        layout: Layout::for_request(&req, &current),
        job,
    })
}

#[post("/apply/{job_id}/")]
async fn apply(
    req: HttpRequest,
    state: Data<AppState>,
    current: CurrentAccount,
    path: Path<i64>,
    form: Result<MultipartForm<ApplyForm>, actix_web::Error>,
) -> Result<HttpResponse, ServiceError> {
    let job = state.jobs.find_job(path.into_inner()).await?;
    let Some(applicant) = current.0.as_ref() else {
        return Ok(login_redirect(&format!("/apply/{}/", job.id)));
    };

    // A body that is not multipart at all simply carries no resume
    let form = match form {
        Ok(form) => Some(form.into_inner()),
        Err(err) if req.content_type() != "multipart/form-data" => {
            debug!("Apply body is not multipart: {}", err);
            None
        }
        Err(err) => return Err(ServiceError::Payload(err)),
    };
    let upload = form
        .as_ref()
        .and_then(|form| form.resume.as_ref())
        .map(ResumeUpload::from);

    let notice = match state.jobs.apply(&job, applicant, upload).await? {
        ApplyOutcome::Submitted(_) => {
            return redirect_with("/", Message::success(APPLICATION_SUBMITTED), state.secure_cookies);
        }
        ApplyOutcome::MissingResume => Message::error(RESUME_REQUIRED),
        ApplyOutcome::AlreadyApplied => Message::warning(ALREADY_APPLIED),
    };

    render(&ApplyJobPage {
        layout: Layout::for_request(&req, &current).with(notice),
        job,
    })
}

pub fn job_config(config: &mut ServiceConfig) {
    config
        .service(list_jobs)
        .service(post_job_form)
        .service(post_job)
        .service(apply_form)
        .service(apply);
}
