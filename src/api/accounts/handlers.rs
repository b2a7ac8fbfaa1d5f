use actix_web::http::header::LOCATION;
use actix_web::{
    HttpRequest, HttpResponse, get, post,
    web::{Data, Form, Query, ServiceConfig},
};
use tracing::{info, warn};

use super::forms::{
    ACCOUNT_CREATED, INVALID_CREDENTIALS, LoginForm, NextQuery, SignupForm, USERNAME_TAKEN,
    safe_next,
};
use crate::api::error::ServiceError;
use crate::api::flash::Message;
use crate::api::pages::{Layout, LoginPage, SignupPage, redirect_with, render};
use crate::api::state::AppState;
use crate::auth::extractor::{expired_session_cookie, session_cookie, session_token};
use crate::auth::{AuthError, CurrentAccount};

fn signup_page(
    req: &HttpRequest,
    current: &CurrentAccount,
    form: &SignupForm,
    message: &str,
) -> Result<HttpResponse, ServiceError> {
    render(&SignupPage {
        layout: Layout::for_request(req, current).with(Message::error(message)),
        username: form.username.clone(),
        email: form.email.clone(),
    })
}

#[get("/signup/")]
async fn signup_form(
    req: HttpRequest,
    current: CurrentAccount,
) -> Result<HttpResponse, ServiceError> {
    render(&SignupPage {
        layout: Layout::for_request(&req, &current),
        ..Default::default()
    })
}

#[post("/signup/")]
async fn signup(
    req: HttpRequest,
    state: Data<AppState>,
    current: CurrentAccount,
    form: Form<SignupForm>,
) -> Result<HttpResponse, ServiceError> {
    let form = form.into_inner().trimmed();

    if let Err(message) = form.check() {
        warn!("Signup rejected: {}", message);
        return signup_page(&req, &current, &form, &message);
    }

    if state.store.find_account_by_username(&form.username).await?.is_some() {
        warn!("Signup rejected: username {} taken", form.username);
        return signup_page(&req, &current, &form, USERNAME_TAKEN);
    }

    match state
        .auth
        .register(&form.username, &form.email, &form.password1)
        .await
    {
        Ok(_) => redirect_with("/login/", Message::success(ACCOUNT_CREATED), state.secure_cookies),
        // Lost a race with a concurrent signup for the same name
        Err(AuthError::DuplicateUsername(_)) => signup_page(&req, &current, &form, USERNAME_TAKEN),
        Err(err) => Err(err.into()),
    }
}

#[get("/login/")]
async fn login_form(
    req: HttpRequest,
    current: CurrentAccount,
    query: Query<NextQuery>,
) -> Result<HttpResponse, ServiceError> {
    render(&LoginPage {
        layout: Layout::for_request(&req, &current),
        username: String::new(),
        next: safe_next(query.next.as_deref()).to_string(),
    })
}

#[post("/login/")]
async fn login(
    req: HttpRequest,
    state: Data<AppState>,
    current: CurrentAccount,
    form: Form<LoginForm>,
) -> Result<HttpResponse, ServiceError> {
    let form = form.into_inner();
    let next = safe_next(form.next.as_deref()).to_string();

    let session = match state.auth.authenticate(&form.username, &form.password).await {
        Ok(session) => session,
        Err(AuthError::InvalidCredentials) => {
            return render(&LoginPage {
                layout: Layout::for_request(&req, &current)
                    .with(Message::error(INVALID_CREDENTIALS)),
                username: form.username,
                next,
            });
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(previous) = session_token(&req) {
        state.auth.logout(previous).await?;
    }

    Ok(HttpResponse::SeeOther()
        .insert_header((LOCATION, next))
        .cookie(session_cookie(&session, state.secure_cookies))
        .finish())
}

#[get("/logout/")]
async fn logout(req: HttpRequest, state: Data<AppState>) -> Result<HttpResponse, ServiceError> {
    if let Some(token) = session_token(&req) {
        state.auth.logout(token).await?;
        info!("Session ended");
    }

    Ok(HttpResponse::SeeOther()
        .insert_header((LOCATION, "/login/"))
        .cookie(expired_session_cookie())
        .finish())
}

pub fn accounts_config(config: &mut ServiceConfig) {
    config
        .service(signup_form)
        .service(signup)
        .service(login_form)
        .service(login)
        .service(logout);
}
