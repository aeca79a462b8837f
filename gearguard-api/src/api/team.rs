//! Teams roster.

use rocket::Route;
use rocket::serde::json::Json;

use crate::api::{ApiError, store_failure};
use crate::backend::Backend;
use crate::models::TeamWithMembers;
use crate::session_guards::AuthenticatedUser;
use crate::store::team::teams_with_members;

/// - **URL:** `/api/1/Teams`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Teams by name, each with its members.
#[get("/1/Teams")]
pub async fn list_teams_route(
    backend: &Backend,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<TeamWithMembers>>, ApiError> {
    teams_with_members(backend.store.as_ref(), &auth_user.bearer())
        .await
        .map(Json)
        .map_err(|e| store_failure("Failed to load teams", e))
}

pub fn routes() -> Vec<Route> {
    routes![list_teams_route]
}
