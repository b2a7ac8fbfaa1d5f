use std::sync::Arc;

use chrono::Duration;

use crate::api::jobs::JobService;
use crate::auth::Authenticator;
use crate::config::Config;
use crate::db::Store;
use crate::media::MediaStorage;

/// Shared across actix workers through `web::Data`
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Authenticator,
    pub jobs: JobService,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        let media = MediaStorage::new(config.media_root.clone());
        Self {
            auth: Authenticator::new(store.clone(), Duration::hours(config.session_ttl_hours)),
            jobs: JobService::new(store.clone(), media),
            store,
            secure_cookies: config.secure_cookies,
        }
    }
}
