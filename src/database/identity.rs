use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

use super::database::DatabaseError;
use crate::session::UserSession;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("The user with the provided email ({0}) already exists")]
    DuplicateEmail(String),
    #[error("No user record found for email: {0}")]
    UserNotFound(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Identity storage error: {0}")]
    Storage(#[from] DatabaseError),
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Background task failed: {0}")]
    Task(String),
}

/// Email and password as submitted by a login or signup form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: normalize_email(email),
            password: password.to_string(),
        }
    }

    pub fn check(&self) -> Result<(), IdentityError> {
        self.validate().map_err(|errors| {
            let messages: Vec<String> = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            IdentityError::InvalidInput(messages.join("; "))
        })
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The managed identity service: accounts keyed by email, each with a
/// stable uid.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(&self, email: &str, password: &str) -> Result<UserSession, IdentityError>;

    async fn get_user_by_email(&self, email: &str) -> Result<UserSession, IdentityError>;

    async fn authenticate(&self, email: &str, password: &str) -> Result<UserSession, IdentityError>;
}
