use rocket::http::{Cookie, CookieJar};

use crate::backend::Backend;
use crate::session::{Session, SessionRegistry};

/// Closes the caller's session, revokes its tokens remotely and removes
/// the cookie. Works without a session too; returns the closed session if
/// there was one.
pub async fn process_logout(
    backend: &Backend,
    registry: &SessionRegistry,
    cookies: &CookieJar<'_>,
) -> Option<Session> {
    let session_id = cookies.get("session").map(|c| c.value().to_string())?;
    cookies.remove(Cookie::from("session"));

    let session = registry.close(&session_id).await?;
    if let Err(e) = backend.auth.sign_out(&session.access_token).await {
        warn!("Remote sign-out failed for {}: {}", session.email, e);
    }
    info!("Closed session for {}", session.email);
    Some(session)
}
