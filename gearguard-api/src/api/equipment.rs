//! Equipment roster and the equipment report.

use rocket::Route;
use rocket::http::Status;
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::api::{ApiError, api_error, store_failure};
use crate::backend::Backend;
use crate::models::Equipment;
use crate::reporting::{EquipmentReport, equipment_report, matches_search};
use crate::session_guards::AuthenticatedUser;
use crate::store::equipment::{get_equipment, list_equipment};

#[derive(Serialize, TS)]
#[ts(export)]
pub struct EquipmentList {
    pub count: usize,
    pub value: Vec<Equipment>,
}

/// - **URL:** `/api/1/Equipment[?search=drill]`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Sorted by name. `search` matches name or category, ignoring case.
#[get("/1/Equipment?<search>")]
pub async fn list_equipment_route(
    backend: &Backend,
    auth_user: AuthenticatedUser,
    search: Option<&str>,
) -> Result<Json<EquipmentList>, ApiError> {
    let equipment = list_equipment(backend.store.as_ref(), &auth_user.bearer())
        .await
        .map_err(|e| store_failure("Failed to load equipment", e))?;
    let value: Vec<Equipment> = equipment
        .into_iter()
        .filter(|e| matches_search(e, search.unwrap_or_default()))
        .collect();
    Ok(Json(EquipmentList {
        count: value.len(),
        value,
    }))
}

/// - **URL:** `/api/1/Equipment/<id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/1/Equipment/<id>")]
pub async fn get_equipment_route(
    backend: &Backend,
    auth_user: AuthenticatedUser,
    id: i64,
) -> Result<Json<Equipment>, ApiError> {
    match get_equipment(backend.store.as_ref(), &auth_user.bearer(), id).await {
        Ok(Some(equipment)) => Ok(Json(equipment)),
        Ok(None) => Err(api_error(Status::NotFound, format!("Equipment {} not found", id))),
        Err(e) => Err(store_failure("Failed to load equipment", e)),
    }
}

/// - **URL:** `/api/1/Reports/EquipmentCategories[?search=...]`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Category counts for the chart plus the grouped table with average
/// health per category. Equipment without a category is reported as
/// "Uncategorized".
#[get("/1/Reports/EquipmentCategories?<search>")]
pub async fn equipment_categories_report(
    backend: &Backend,
    auth_user: AuthenticatedUser,
    search: Option<&str>,
) -> Result<Json<EquipmentReport>, ApiError> {
    let equipment = list_equipment(backend.store.as_ref(), &auth_user.bearer())
        .await
        .map_err(|e| store_failure("Failed to load equipment", e))?;
    Ok(Json(equipment_report(equipment, search.unwrap_or_default())))
}

pub fn routes() -> Vec<Route> {
    routes![list_equipment_route, get_equipment_route, equipment_categories_report]
}
