//! Remote authentication service.
//!
//! Accounts, password checks and token issuance live in the backend; this
//! module only describes the calls we make against it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ProfileId;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("session is no longer valid")]
    SessionExpired,

    #[error("authentication service rejected the request: {0}")]
    Rejected(String),

    #[error("authentication service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The account record the auth service reports for a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: ProfileId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Tokens issued on sign-in or refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// Extra attributes stored with a new account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub role: Option<String>,
}

#[rocket::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Creates an account. Returns the new user; a session is included when
    /// the backend signs new accounts in immediately.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<(AuthUser, Option<AuthSession>), AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;
}
