//! Work center roster.

use rocket::Route;
use rocket::serde::json::Json;

use crate::api::{ApiError, store_failure};
use crate::backend::Backend;
use crate::models::WorkCenter;
use crate::reporting::matches_work_center;
use crate::session_guards::AuthenticatedUser;
use crate::store::work_center::list_work_centers;

/// - **URL:** `/api/1/WorkCenters[?search=assembly]`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// `search` matches name, code or tag, ignoring case.
#[get("/1/WorkCenters?<search>")]
pub async fn list_work_centers_route(
    backend: &Backend,
    auth_user: AuthenticatedUser,
    search: Option<&str>,
) -> Result<Json<Vec<WorkCenter>>, ApiError> {
    let centers = list_work_centers(backend.store.as_ref(), &auth_user.bearer())
        .await
        .map_err(|e| store_failure("Failed to load work centers", e))?;
    Ok(Json(
        centers
            .into_iter()
            .filter(|c| matches_work_center(c, search.unwrap_or_default()))
            .collect(),
    ))
}

pub fn routes() -> Vec<Route> {
    routes![list_work_centers_route]
}
