use serde::Deserialize;
use validator::Validate;

use crate::api::validation::{first_message, non_blank};

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match.";
pub const USERNAME_TAKEN: &str = "Username already exists.";
pub const ACCOUNT_CREATED: &str = "Account created successfully. Please login.";
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Registration form. Missing fields deserialize as empty strings.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupForm {
    #[validate(
        custom(function = "non_blank"),
        length(max = 150, message = "Username must be at most 150 characters.")
    )]
    pub username: String,
    #[validate(
        custom(function = "non_blank"),
        length(max = 254, message = "Email must be at most 254 characters.")
    )]
    pub email: String,
    #[validate(
        custom(function = "non_blank"),
        must_match(other = "password2", message = "Passwords do not match.")
    )]
    pub password1: String,
    #[validate(custom(function = "non_blank"))]
    pub password2: String,
}

impl SignupForm {
    /// Username and email are stored trimmed; passwords are taken verbatim.
    pub fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        }
    }

    /// Field checks in order, first failure wins. Username availability is
    /// checked against the store by the handler.
    pub fn check(&self) -> Result<(), String> {
        self.validate()
            .map_err(|errors| first_message(&errors, &["password1", "username", "email"]))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path
        }
        _ => "/",
    }
}
