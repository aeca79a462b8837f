//! Server-side sessions.
//!
//! Signing in opens a [`Session`] holding the backend tokens plus the
//! display name and email shown in the header; the browser only gets an
//! opaque id in the `session` cookie. Signing out closes it. Sessions live
//! in process memory, so a restart signs everyone out.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rocket::tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::ProfileId;
use crate::store::{AuthError, AuthProvider, AuthSession, Bearer};

/// How long after its access token expired an unused session is kept.
const STALE_AFTER_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub user_id: ProfileId,
    pub email: String,
    pub display_name: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub opened_at: DateTime<Utc>,
}

impl Session {
    pub fn bearer(&self) -> Bearer {
        Bearer::token(self.access_token.clone())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }

    /// Expired long enough ago that nobody is coming back to refresh it.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|at| at + Duration::days(STALE_AFTER_DAYS) <= now)
            .unwrap_or(false)
    }

    /// Profile name when known, otherwise the email address.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
    refreshing: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for freshly issued tokens. Stale sessions are
    /// dropped on the way.
    pub async fn open(&self, auth: AuthSession, display_name: Option<String>) -> Session {
        self.prune(Utc::now()).await;
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: auth.user.id,
            email: auth.user.email,
            display_name: display_name.or(auth.user.full_name),
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            expires_at: auth.expires_at,
            opened_at: Utc::now(),
        };
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        session
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Ends a session, returning it if it was open.
    pub async fn close(&self, id: &str) -> Option<Session> {
        self.refreshing.lock().await.remove(id);
        self.sessions.write().await.remove(id)
    }

    /// Removes sessions that expired more than a week before `now`.
    pub async fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_stale(now));
        let pruned = before - sessions.len();
        if pruned > 0 {
            self.refreshing
                .lock()
                .await
                .retain(|id, _| sessions.contains_key(id));
            info!("Pruned {} stale sessions", pruned);
        }
        pruned
    }

    /// Renews an expired session with its refresh token.
    ///
    /// Refreshes of one session run one at a time. A caller that waited on
    /// another refresh gets the tokens that refresh stored, since the
    /// refresh token it saw has already been spent. If the auth service
    /// refuses, the session is closed.
    pub async fn refresh(&self, id: &str, auth: &dyn AuthProvider) -> Result<Session, AuthError> {
        let lock = self
            .refreshing
            .lock()
            .await
            .entry(id.to_string())
            .or_default()
            .clone();
        let _refreshing = lock.lock().await;

        let current = self.get(id).await.ok_or(AuthError::SessionExpired)?;
        if !current.is_expired(Utc::now()) {
            return Ok(current);
        }
        match auth.refresh_session(&current.refresh_token).await {
            Ok(tokens) => self.renew(id, tokens).await.ok_or(AuthError::SessionExpired),
            Err(e) => {
                self.close(id).await;
                Err(e)
            }
        }
    }

    /// Swaps in refreshed tokens, keeping the session id and cached names.
    pub async fn renew(&self, id: &str, auth: AuthSession) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        session.access_token = auth.access_token;
        session.refresh_token = auth.refresh_token;
        session.expires_at = auth.expires_at;
        Some(session.clone())
    }

    pub async fn set_display_name(&self, id: &str, name: &str) {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session.display_name = Some(name.to_string());
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
