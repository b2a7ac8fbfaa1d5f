mod common;

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use common::{apply_request, harness, location, post_job_request, signed_in, state_with};
use job_board::auth::SESSION_COOKIE;
use job_board::db::models::{
    Account, Application, ApplicationStatus, Job, NewAccount, NewApplication, NewJob, Session,
};
use job_board::db::{Store, StoreError};

/// Every call fails the way an unreachable database does
struct BrokenStore;

fn down() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl Store for BrokenStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Err(down())
    }
    async fn close(&self) {}
    async fn create_account(&self, _: NewAccount) -> Result<Account, StoreError> {
        Err(down())
    }
    async fn find_account_by_username(&self, _: &str) -> Result<Option<Account>, StoreError> {
        Err(down())
    }
    async fn find_account(&self, _: i64) -> Result<Option<Account>, StoreError> {
        Err(down())
    }
    async fn delete_account(&self, _: i64) -> Result<bool, StoreError> {
        Err(down())
    }
    async fn create_session(&self, _: i64, _: DateTime<Utc>) -> Result<Session, StoreError> {
        Err(down())
    }
    async fn find_session(&self, _: Uuid) -> Result<Option<Session>, StoreError> {
        Err(down())
    }
    async fn delete_session(&self, _: Uuid) -> Result<(), StoreError> {
        Err(down())
    }
    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Err(down())
    }
    async fn find_job(&self, _: i64) -> Result<Option<Job>, StoreError> {
        Err(down())
    }
    async fn create_job(&self, _: NewJob) -> Result<Job, StoreError> {
        Err(down())
    }
    async fn delete_job(&self, _: i64) -> Result<bool, StoreError> {
        Err(down())
    }
    async fn application_exists(&self, _: i64, _: i64) -> Result<bool, StoreError> {
        Err(down())
    }
    async fn create_application(&self, _: NewApplication) -> Result<Application, StoreError> {
        Err(down())
    }
    async fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        Err(down())
    }
    async fn set_application_status(
        &self,
        _: i64,
        _: ApplicationStatus,
    ) -> Result<Option<Application>, StoreError> {
        Err(down())
    }
}

async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

#[actix_web::test]
async fn listing_shows_newest_job_first() {
    let h = harness();
    let app = init_app!(h.state);
    let alice = signed_in(&h.state, "alice").await;

    for title in ["First opening", "Second opening"] {
        let resp = test::call_service(
            &app,
            post_job_request(&alice, title, "Details", "Remote").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
    }

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    let first = body.find("First opening").expect("first job listed");
    let second = body.find("Second opening").expect("second job listed");
    assert!(second < first);
    assert!(body.contains("posted by alice"));
}

#[actix_web::test]
async fn anonymous_posting_redirects_and_creates_nothing() {
    let h = harness();
    let app = init_app!(h.state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/post/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login/?next=/post/");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post/")
            .set_form(&[("title", "Engineer"), ("description", "Build"), ("location", "Remote")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login/?next=/post/");
    assert!(h.store.list_jobs().await.unwrap().is_empty());
}

#[actix_web::test]
async fn blank_job_fields_rerender_the_form() {
    let h = harness();
    let app = init_app!(h.state);
    let alice = signed_in(&h.state, "alice").await;

    let resp = test::call_service(
        &app,
        post_job_request(&alice, "Engineer", "   ", "Remote").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("All fields are required."));
    assert!(body.contains("Engineer"));
    assert!(h.store.list_jobs().await.unwrap().is_empty());
}

#[actix_web::test]
async fn applying_to_a_missing_job_is_not_found() {
    let h = harness();
    let app = init_app!(h.state);
    let bob = signed_in(&h.state, "bob").await;

    let resp = test::call_service(&app, apply_request(999, None, None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        apply_request(999, Some(&bob), Some(("cv.pdf", &b"%PDF"[..]))).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/apply/999/").cookie(bob.clone()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/apply/abc/").cookie(bob).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(h.store.list_applications().await.unwrap().is_empty());
}

#[actix_web::test]
async fn anonymous_apply_redirects_to_login() {
    let h = harness();
    let app = init_app!(h.state);
    let alice = signed_in(&h.state, "alice").await;
    test::call_service(&app, post_job_request(&alice, "Engineer", "Build", "Remote").to_request())
        .await;
    let job_id = h.store.list_jobs().await.unwrap()[0].id;

    let resp = test::call_service(
        &app,
        apply_request(job_id, None, Some(("cv.pdf", &b"%PDF"[..]))).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/login/?next=/apply/{job_id}/"));
    assert!(h.store.list_applications().await.unwrap().is_empty());
}

#[actix_web::test]
async fn apply_without_a_resume_is_rejected() {
    let h = harness();
    let app = init_app!(h.state);
    let alice = signed_in(&h.state, "alice").await;
    let bob = signed_in(&h.state, "bob").await;
    test::call_service(&app, post_job_request(&alice, "Engineer", "Build", "Remote").to_request())
        .await;
    let job_id = h.store.list_jobs().await.unwrap()[0].id;

    let resp = test::call_service(&app, apply_request(job_id, Some(&bob), None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Please upload a resume."));

    // A form post without any multipart body carries no resume either
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/apply/{job_id}/"))
            .cookie(bob)
            .set_form(&[("note", "hello")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Please upload a resume."));
    assert!(h.store.list_applications().await.unwrap().is_empty());
}

#[actix_web::test]
async fn listing_degrades_when_the_store_is_down() {
    let (state, _media) = state_with(Arc::new(BrokenStore));
    let app = init_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Error loading jobs. Please try again later."));
    assert!(!body.contains("class=\"job\""));

    // A visitor holding a session cookie is treated as anonymous
    let session = Cookie::new(SESSION_COOKIE, Uuid::new_v4().to_string());
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(session).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Error loading jobs. Please try again later."));
    assert!(body.contains("Log in"));
}

#[actix_web::test]
async fn health_probes_follow_the_store() {
    let h = harness();
    let app = init_app!(h.state);
    for uri in ["/health", "/ready", "/live"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }

    let (state, _media) = state_with(Arc::new(BrokenStore));
    let app = init_app!(state);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_text(resp).await.contains("unhealthy"));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/live").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
