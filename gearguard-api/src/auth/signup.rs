use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::backend::Backend;
use crate::models::{ProfileInput, ProfileRole};
use crate::store::auth::SignUpMetadata;
use crate::store::profile::upsert_profile;
use crate::store::{AuthError, AuthUser, Bearer};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Deserialize, TS)]
#[ts(export)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub role: Option<ProfileRole>,
}

#[derive(Error, Debug)]
pub enum SignupError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SignupOutcome {
    pub user_id: String,
    pub email: String,
    /// False when the account exists but its profile row could not be saved.
    pub profile_saved: bool,
    /// True when the account must be confirmed by email before signing in.
    pub confirmation_required: bool,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), SignupError> {
        if self.name.trim().is_empty() {
            return Err(SignupError::Invalid("Name is required".to_string()));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(SignupError::Invalid("Invalid email".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SignupError::Invalid(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if let Some(confirm) = &self.confirm_password {
            if *confirm != self.password {
                return Err(SignupError::Invalid("Passwords don't match".to_string()));
            }
        }
        Ok(())
    }
}

/// Creates the account, then writes its profile row. The profile write is
/// best effort: the account already exists at that point, so a failure
/// is reported in the outcome rather than as an error.
pub async fn process_signup(backend: &Backend, request: &SignupRequest) -> Result<SignupOutcome, SignupError> {
    request.validate()?;

    let email = request.email.trim();
    let metadata = SignUpMetadata {
        full_name: request.name.trim().to_string(),
        role: request.role.map(|r| r.to_string()),
    };
    let (user, session) = backend.auth.sign_up(email, &request.password, &metadata).await?;
    info!("Created account {}", user.email);

    let bearer = session
        .as_ref()
        .map(|s| Bearer::token(s.access_token.clone()))
        .unwrap_or_default();
    let profile_saved = save_profile(backend, &bearer, &user, request).await;

    Ok(SignupOutcome {
        user_id: user.id,
        email: user.email,
        profile_saved,
        confirmation_required: session.is_none(),
    })
}

async fn save_profile(backend: &Backend, bearer: &Bearer, user: &AuthUser, request: &SignupRequest) -> bool {
    let input = ProfileInput {
        id: user.id.clone(),
        full_name: request.name.trim().to_string(),
        role: request.role,
        email: Some(user.email.clone()),
    };
    match upsert_profile(backend.store.as_ref(), bearer, &input).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Saving profile failed for {}, account was created: {}", user.email, e);
            false
        }
    }
}
