use rocket::http::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::backend::Backend;
use crate::session::{Session, SessionRegistry};
use crate::store::profile::profile_full_name;
use crate::store::{AuthError, AuthSession, Bearer};

#[derive(Clone, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signs in against the auth service, opens a session and sets the
/// `session` cookie.
pub async fn process_login(
    backend: &Backend,
    registry: &SessionRegistry,
    cookies: &CookieJar<'_>,
    login: &LoginRequest,
) -> Result<Session, AuthError> {
    let tokens = backend
        .auth
        .sign_in_with_password(login.email.trim(), &login.password)
        .await?;
    let display_name = lookup_display_name(backend, &tokens).await;

    let session = registry.open(tokens, display_name).await;
    set_session_cookie(cookies, &session.id);
    info!("Opened session for {}", session.email);
    Ok(session)
}

/// The profile's full name, used as the header name. A failed lookup is
/// not a failed sign-in; the session falls back to the email address.
async fn lookup_display_name(backend: &Backend, tokens: &AuthSession) -> Option<String> {
    let bearer = Bearer::token(tokens.access_token.clone());
    match profile_full_name(backend.store.as_ref(), &bearer, &tokens.user.id).await {
        Ok(name) => name.filter(|n| !n.trim().is_empty()),
        Err(e) => {
            warn!("Could not load profile name for {}: {}", tokens.user.email, e);
            None
        }
    }
}

pub fn set_session_cookie(cookies: &CookieJar<'_>, session_id: &str) {
    let cookie = Cookie::build(("session", session_id.to_string()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/");
    cookies.add(cookie);
}
