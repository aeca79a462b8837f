//! Sign-in endpoint and the session check used by the view layer on load.

use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::Serialize;
use ts_rs::TS;

use crate::api::{ApiError, api_error};
use crate::auth::{LoginRequest, process_login};
use crate::backend::Backend;
use crate::session::{Session, SessionRegistry};
use crate::session_guards::AuthenticatedUser;
use crate::store::AuthError;

/// What the header shows for the signed-in user. Login and hello answer
/// with the same shape.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct LoginSuccessResponse {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

impl From<&Session> for LoginSuccessResponse {
    fn from(session: &Session) -> Self {
        LoginSuccessResponse {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
            name: session.name().to_string(),
        }
    }
}

/// Login endpoint.
///
/// - **URL:** `/api/1/login`
/// - **Method:** `POST`
/// - **Authentication:** None required
///
/// Checks the credentials with the auth service, opens a session and sets
/// the HTTP-only `session` cookie. The profile's full name is looked up
/// once here and cached on the session.
///
/// ```json
/// { "email": "sarah@gearguard.test", "password": "..." }
/// ```
///
/// **Failure (HTTP 401):** `{ "error": "Invalid credentials" }`
#[post("/1/login", data = "<login>")]
pub async fn login(
    backend: &Backend,
    registry: &State<SessionRegistry>,
    cookies: &CookieJar<'_>,
    login: Json<LoginRequest>,
) -> Result<Json<LoginSuccessResponse>, ApiError> {
    match process_login(backend, registry, cookies, &login).await {
        Ok(session) => Ok(Json(LoginSuccessResponse::from(&session))),
        Err(AuthError::InvalidCredentials) => {
            info!("Rejected sign-in for {}", login.email.trim());
            Err(api_error(Status::Unauthorized, "Invalid credentials"))
        }
        Err(e) => {
            error!("Sign-in failed for {}: {}", login.email.trim(), e);
            Err(api_error(Status::BadGateway, "Authentication service unavailable"))
        }
    }
}

/// Hello endpoint.
///
/// - **URL:** `/api/1/hello`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Answers from the cached session fields, no store round trip.
#[get("/1/hello")]
pub async fn secure_hello(auth_user: AuthenticatedUser) -> Json<LoginSuccessResponse> {
    Json(LoginSuccessResponse::from(&auth_user.session))
}

pub fn routes() -> Vec<Route> {
    routes![login, secure_hello]
}
