use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::error;
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::api::state::AppState;
use crate::db::models::{Account, Session};

pub const SESSION_COOKIE: &str = "session_id";

/// The account behind the request's session cookie, if any.
///
/// Never rejects a request on its own; handlers that need a login redirect
/// when this is `None`.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Option<Account>);

impl CurrentAccount {
    pub fn username(&self) -> Option<String> {
        self.0.as_ref().map(|account| account.username.clone())
    }
}

pub fn session_token(req: &HttpRequest) -> Option<Uuid> {
    req.cookie(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

impl FromRequest for CurrentAccount {
    type Error = ServiceError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = session_token(req);

        Box::pin(async move {
            let (Some(state), Some(token)) = (state, token) else {
                return Ok(CurrentAccount(None));
            };
            // An unreachable store degrades to an anonymous visitor
            match state.auth.current_account(token).await {
                Ok(account) => Ok(CurrentAccount(account)),
                Err(err) => {
                    error!("Failed to resolve session: {:?}", err);
                    Ok(CurrentAccount(None))
                }
            }
        })
    }
}

pub fn session_cookie(session: &Session, secure: bool) -> Cookie<'static> {
    let max_age = (session.expires_at - session.created_at).num_seconds().max(0);
    Cookie::build(SESSION_COOKIE, session.token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age))
        .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}
