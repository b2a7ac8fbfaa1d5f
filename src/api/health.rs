use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use tracing::error;

use super::state::AppState;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn probe_store(state: &AppState, up: &str, down: &str) -> HttpResponse {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: up.to_string(),
            database: "connected".to_string(),
            error: None,
        }),
        Err(e) => {
            error!("{} check failed: {:?}", up, e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: down.to_string(),
                database: "disconnected".to_string(),
                error: Some(format!("Database unavailable: {}", e)),
            })
        }
    }
}

/// Health check endpoint
///
/// General health check including database connectivity.
/// Use for load balancers and uptime monitors.
#[get("/health")]
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    probe_store(&state, "healthy", "unhealthy").await
}

/// Readiness check endpoint
///
/// Returns 503 while the store is unreachable; recovers when it returns.
#[get("/ready")]
async fn readiness_check(state: web::Data<AppState>) -> impl Responder {
    probe_store(&state, "ready", "not_ready").await
}

/// Liveness check endpoint. Does not check dependencies.
#[get("/live")]
async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "alive".to_string(),
        database: "not_checked".to_string(),
        error: None,
    })
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config
        .service(health_check)
        .service(readiness_check)
        .service(liveness_check);
}
