//! Account registration, credential checks and server-side sessions

pub mod extractor;
pub mod password;

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::models::{Account, NewAccount, Session};
use crate::db::{Store, StoreError};

pub use extractor::{CurrentAccount, SESSION_COOKIE};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(argon2::password_hash::Error),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername(name) => AuthError::DuplicateUsername(name),
            other => AuthError::Store(other),
        }
    }
}

#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn Store>,
    session_ttl: Duration,
}

impl Authenticator {
    pub fn new(store: Arc<dyn Store>, session_ttl: Duration) -> Self {
        Self { store, session_ttl }
    }

    /// Create an account with a hashed credential
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, AuthError> {
        let password_hash = password::hash_password(password).map_err(AuthError::Hashing)?;
        let account = self
            .store
            .create_account(NewAccount {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        info!("Account registered: id={}, username={}", account.id, account.username);
        Ok(account)
    }

    /// Check credentials and open a session
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let account = match self.store.find_account_by_username(username).await? {
            Some(account) if password::verify_password(password, &account.password_hash) => account,
            _ => {
                warn!("Login rejected for username={}", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let session = self
            .store
            .create_session(account.id, Utc::now() + self.session_ttl)
            .await?;

        info!("Login succeeded: account id={}", account.id);
        Ok(session)
    }

    /// Resolve a session token to its account. Expired sessions are deleted.
    pub async fn current_account(&self, token: Uuid) -> Result<Option<Account>, StoreError> {
        let Some(session) = self.store.find_session(token).await? else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            self.store.delete_session(token).await?;
            return Ok(None);
        }

        self.store.find_account(session.account_id).await
    }

    pub async fn logout(&self, token: Uuid) -> Result<(), StoreError> {
        self.store.delete_session(token).await
    }
}
