//! Settings page: the caller's own profile.

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::api::{ApiError, api_error, store_failure};
use crate::backend::Backend;
use crate::logged_json::LoggedJson;
use crate::models::Profile;
use crate::session::SessionRegistry;
use crate::session_guards::AuthenticatedUser;
use crate::store::profile::{get_profile, update_full_name};

const MAX_NAME_LEN: usize = 100;

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct UpdateProfileRequest {
    pub full_name: String,
}

/// - **URL:** `/api/1/profile`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/1/profile")]
pub async fn get_own_profile(
    backend: &Backend,
    auth_user: AuthenticatedUser,
) -> Result<Json<Profile>, ApiError> {
    match get_profile(backend.store.as_ref(), &auth_user.bearer(), auth_user.user_id()).await {
        Ok(Some(profile)) => Ok(Json(profile)),
        Ok(None) => Err(api_error(Status::NotFound, "Profile not found")),
        Err(e) => Err(store_failure("Failed to load profile", e)),
    }
}

/// - **URL:** `/api/1/profile`
/// - **Method:** `PUT`
/// - **Authentication:** Required
///
/// Renames the caller. The session's cached name follows, so the header
/// picks it up without signing in again.
#[put("/1/profile", data = "<update>")]
pub async fn update_own_profile(
    backend: &Backend,
    registry: &State<SessionRegistry>,
    auth_user: AuthenticatedUser,
    update: LoggedJson<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let name = update.full_name.trim();
    if name.is_empty() {
        return Err(api_error(Status::UnprocessableEntity, "Name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(api_error(
            Status::UnprocessableEntity,
            format!("Name must be at most {} characters", MAX_NAME_LEN),
        ));
    }

    match update_full_name(backend.store.as_ref(), &auth_user.bearer(), auth_user.user_id(), name).await {
        Ok(Some(profile)) => {
            registry.set_display_name(&auth_user.session.id, name).await;
            Ok(Json(profile))
        }
        Ok(None) => Err(api_error(Status::NotFound, "Profile not found")),
        Err(e) => Err(store_failure("Failed to update profile", e)),
    }
}

pub fn routes() -> Vec<Route> {
    routes![get_own_profile, update_own_profile]
}
