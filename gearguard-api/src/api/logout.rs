//! Sign-out endpoint.

use rocket::http::CookieJar;
use rocket::serde::json::{Json, Value, json};
use rocket::{Route, State};

use crate::auth::process_logout;
use crate::backend::Backend;
use crate::session::SessionRegistry;

/// Logout endpoint.
///
/// - **URL:** `/api/1/logout`
/// - **Method:** `POST`
/// - **Authentication:** None required
///
/// Closes the session, revokes its tokens with the auth service and removes
/// the cookie. Always answers 200, with or without a session.
#[post("/1/logout")]
pub async fn logout(
    backend: &Backend,
    registry: &State<SessionRegistry>,
    cookies: &CookieJar<'_>,
) -> Json<Value> {
    process_logout(backend, registry, cookies).await;
    Json(json!({
        "message": "Logout successful",
        "status": "ok"
    }))
}

pub fn routes() -> Vec<Route> {
    routes![logout]
}
