use actix_web::web::{PathConfig, ServiceConfig};

use super::accounts::accounts_config;
use super::error::ServiceError;
use super::health::health_config;
use super::jobs::job_config;

/// Routing table
///
/// - `GET /`                      list jobs
/// - `GET|POST /signup/`          register
/// - `GET|POST /login/`           authenticate
/// - `GET /logout/`               log out
/// - `GET|POST /post/`            post a job (login required)
/// - `GET|POST /apply/{job_id}/`  apply to a job (login required)
/// - `GET /health`, `/ready`, `/live`
pub fn configure(config: &mut ServiceConfig) {
    config
        // A job id that is not a number names no job
        .app_data(PathConfig::default().error_handler(|err, req| {
            ServiceError::NotFound(format!("{} ({})", req.path(), err)).into()
        }))
        .configure(health_config)
        .configure(accounts_config)
        .configure(job_config);
}
