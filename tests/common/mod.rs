#![allow(dead_code)]

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{CONTENT_TYPE, LOCATION};
use actix_web::test::TestRequest;
use actix_web::web;
use tempfile::TempDir;

use job_board::api::state::AppState;
use job_board::auth::extractor::session_cookie;
use job_board::config::Config;
use job_board::db::{MemoryStore, Store};

pub const BOUNDARY: &str = "----job-board-test-boundary";

/// Builds the full application around `$state` (a `web::Data<AppState>`)
#[macro_export]
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(job_board::api::routes::configure),
        )
        .await
    };
}

pub struct Harness {
    pub state: web::Data<AppState>,
    pub store: Arc<MemoryStore>,
    pub media_root: TempDir,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let (state, media_root) = state_with(store.clone());
    Harness { state, store, media_root }
}

pub fn state_with(store: Arc<dyn Store>) -> (web::Data<AppState>, TempDir) {
    let media_root = tempfile::tempdir().expect("temp media root");
    let mut config = Config::from_lookup(|_| None);
    config.media_root = media_root.path().to_path_buf();
    (web::Data::new(AppState::new(store, &config)), media_root)
}

/// Registers `username` and opens a session, returning its cookie
pub async fn signed_in(state: &web::Data<AppState>, username: &str) -> Cookie<'static> {
    state
        .auth
        .register(username, &format!("{username}@example.com"), "x123456")
        .await
        .expect("register");
    let session = state.auth.authenticate(username, "x123456").await.expect("login");
    session_cookie(&session, false)
}

pub fn signup_request(username: &str, email: &str, password1: &str, password2: &str) -> TestRequest {
    TestRequest::post().uri("/signup/").set_form(&[
        ("username", username),
        ("email", email),
        ("password1", password1),
        ("password2", password2),
    ])
}

pub fn login_request(username: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/login/")
        .set_form(&[("username", username), ("password", password)])
}

pub fn post_job_request(session: &Cookie<'static>, title: &str, description: &str, location: &str) -> TestRequest {
    TestRequest::post()
        .uri("/post/")
        .cookie(session.clone())
        .set_form(&[("title", title), ("description", description), ("location", location)])
}

/// Multipart apply form; `None` sends the form without any resume part
pub fn apply_request(job_id: i64, session: Option<&Cookie<'static>>, resume: Option<(&str, &[u8])>) -> TestRequest {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n"
        )
        .as_bytes(),
    );
    if let Some((file_name, content)) = resume {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut req = TestRequest::post()
        .uri(&format!("/apply/{job_id}/"))
        .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")))
        .set_payload(body);
    if let Some(session) = session {
        req = req.cookie(session.clone());
    }
    req
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}
