use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use askama::Template;

use super::error::ServiceError;
use super::flash::{self, Message};
use crate::auth::CurrentAccount;
use crate::db::models::Job;

/// Data every page shares: who is logged in and which notices to show
#[derive(Debug, Default)]
pub struct Layout {
    pub current_user: Option<String>,
    pub messages: Vec<Message>,
    clear_flash: bool,
}

impl Layout {
    /// Takes pending flash messages off the request; the response clears the cookie.
    pub fn for_request(req: &HttpRequest, current: &CurrentAccount) -> Self {
        let pending = flash::pending(req);
        Self {
            current_user: current.username(),
            clear_flash: pending.is_some(),
            messages: pending.unwrap_or_default(),
        }
    }

    pub fn with(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub layout: Layout,
    pub jobs: Vec<Job>,
}

#[derive(Template, Default)]
#[template(path = "signup.html")]
pub struct SignupPage {
    pub layout: Layout,
    pub username: String,
    pub email: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub layout: Layout,
    pub username: String,
    pub next: String,
}

#[derive(Template, Default)]
#[template(path = "post_job.html")]
pub struct PostJobPage {
    pub layout: Layout,
    pub title: String,
    pub description: String,
    pub location: String,
}

#[derive(Template)]
#[template(path = "apply_job.html")]
pub struct ApplyJobPage {
    pub layout: Layout,
    pub job: Job,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub layout: Layout,
    pub status: u16,
    pub reason: String,
    pub detail: String,
}

macro_rules! impl_layout {
    ($($page:ty),* $(,)?) => {
        $(impl AsRef<Layout> for $page {
            fn as_ref(&self) -> &Layout {
                &self.layout
            }
        })*
    };
}

impl_layout!(HomePage, SignupPage, LoginPage, PostJobPage, ApplyJobPage, ErrorPage);

pub fn render<T>(page: &T) -> Result<HttpResponse, ServiceError>
where
    T: Template + AsRef<Layout>,
{
    render_with_status(page, StatusCode::OK)
}

pub fn render_with_status<T>(page: &T, status: StatusCode) -> Result<HttpResponse, ServiceError>
where
    T: Template + AsRef<Layout>,
{
    let body = page.render()?;
    let mut response = HttpResponse::build(status);
    response.content_type("text/html; charset=utf-8");
    if page.as_ref().clear_flash {
        response.cookie(flash::removal());
    }
    Ok(response.body(body))
}

/// 303 so a refresh after a POST never re-submits
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((actix_web::http::header::LOCATION, location))
        .finish()
}

pub fn redirect_with(
    location: &str,
    message: Message,
    secure: bool,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::SeeOther()
        .insert_header((actix_web::http::header::LOCATION, location))
        .cookie(flash::cookie(&[message], secure)?)
        .finish())
}

pub fn login_redirect(next: &str) -> HttpResponse {
    redirect(&format!("/login/?next={next}"))
}
