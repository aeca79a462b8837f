//! Account creation endpoint.

use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::Route;

use crate::api::{ApiError, api_error};
use crate::auth::{SignupError, SignupOutcome, SignupRequest, process_signup};
use crate::backend::Backend;
use crate::store::AuthError;

/// Signup endpoint.
///
/// - **URL:** `/api/1/signup`
/// - **Method:** `POST`
/// - **Authentication:** None required
///
/// ```json
/// { "name": "Jordan Lee", "email": "jordan@example.com", "role": "technician",
///   "password": "secret1", "confirm_password": "secret1" }
/// ```
///
/// Answers 201 once the account exists. `profile_saved` is false when the
/// profile row could not be written; the account is usable regardless.
/// Validation problems answer 422 with the first failing rule.
#[post("/1/signup", data = "<signup>")]
pub async fn signup(
    backend: &Backend,
    signup: Json<SignupRequest>,
) -> Result<status::Created<Json<SignupOutcome>>, ApiError> {
    match process_signup(backend, &signup).await {
        Ok(outcome) => Ok(status::Created::new("/api/1/profile").body(Json(outcome))),
        Err(SignupError::Invalid(message)) => Err(api_error(Status::UnprocessableEntity, message)),
        Err(SignupError::Auth(AuthError::Rejected(message))) => {
            warn!("Sign-up rejected for {}: {}", signup.email.trim(), message);
            Err(api_error(Status::BadRequest, format!("Sign up failed: {}", message)))
        }
        Err(SignupError::Auth(e)) => {
            error!("Sign-up failed for {}: {}", signup.email.trim(), e);
            Err(api_error(Status::BadGateway, "Authentication service unavailable"))
        }
    }
}

pub fn routes() -> Vec<Route> {
    routes![signup]
}
