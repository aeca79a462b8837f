//! API endpoints for maintenance requests.
//!
//! Reads return enriched records: the request row plus the names of the
//! equipment, creator and technician it references. Writes go straight to
//! the store and answer with the enriched result of the write.

use rocket::Route;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::api::{ApiError, api_error, store_failure};
use crate::backend::Backend;
use crate::enrichment::{enrich_requests, fetch_enriched_request, fetch_enriched_requests};
use crate::logged_json::LoggedJson;
use crate::models::{
    EnrichedMaintenanceRequest, MaintenanceRequestPatch, NewMaintenanceRequest, Priority,
    RequestType, Stage,
};
use crate::session_guards::AuthenticatedUser;
use crate::store::maintenance_request::{
    RequestOrder, delete_request, insert_request, update_request,
};

/// Request payload for creating a maintenance request. The creator is
/// always the signed-in user.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct CreateMaintenanceRequest {
    pub subject: String,
    pub description: Option<String>,
    pub technician_id: Option<String>,
    pub scheduled_date: Option<chrono::DateTime<chrono::Utc>>,
    pub duration_hours: Option<f64>,
    pub equipment_id: Option<i64>,
    pub work_center_id: Option<i64>,
    pub priority: Option<Priority>,
    pub request_type: Option<RequestType>,
    pub stage: Option<Stage>,
}

impl CreateMaintenanceRequest {
    fn into_new(self, created_by: &str) -> NewMaintenanceRequest {
        NewMaintenanceRequest {
            subject: self.subject.trim().to_string(),
            description: self.description,
            created_by: Some(created_by.to_string()),
            technician_id: self.technician_id,
            scheduled_date: self.scheduled_date,
            duration_hours: self.duration_hours,
            equipment_id: self.equipment_id,
            work_center_id: self.work_center_id,
            priority: self.priority,
            request_type: self.request_type,
            stage: self.stage.or(Some(Stage::New)),
        }
    }
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct MaintenanceRequestList {
    pub count: usize,
    pub value: Vec<EnrichedMaintenanceRequest>,
}

/// List Maintenance Requests endpoint.
///
/// - **URL:** `/api/1/MaintenanceRequests[?order=created_at.desc]`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Newest first by default. `order` accepts `created_at`,
/// `scheduled_date`, `priority` or `subject`, optionally suffixed with
/// `.asc` or `.desc`.
#[get("/1/MaintenanceRequests?<order>")]
pub async fn list_maintenance_requests(
    backend: &Backend,
    auth_user: AuthenticatedUser,
    order: Option<&str>,
) -> Result<Json<MaintenanceRequestList>, ApiError> {
    let order = match order.map(str::parse::<RequestOrder>).transpose() {
        Ok(order) => order.unwrap_or_default(),
        Err(message) => return Err(api_error(Status::BadRequest, message)),
    };

    fetch_enriched_requests(backend.store.as_ref(), &auth_user.bearer(), order)
        .await
        .map(|value| {
            Json(MaintenanceRequestList {
                count: value.len(),
                value,
            })
        })
        .map_err(|e| store_failure("Failed to load maintenance requests", e))
}

/// Get Maintenance Request endpoint.
///
/// - **URL:** `/api/1/MaintenanceRequests/<id>`
/// - **Method:** `GET`
/// - **Authentication:** Required
#[get("/1/MaintenanceRequests/<id>")]
pub async fn get_maintenance_request(
    backend: &Backend,
    auth_user: AuthenticatedUser,
    id: i64,
) -> Result<Json<EnrichedMaintenanceRequest>, ApiError> {
    match fetch_enriched_request(backend.store.as_ref(), &auth_user.bearer(), id).await {
        Ok(Some(request)) => Ok(Json(request)),
        Ok(None) => Err(api_error(
            Status::NotFound,
            format!("Maintenance request {} not found", id),
        )),
        Err(e) => Err(store_failure("Failed to load maintenance request", e)),
    }
}

/// Create Maintenance Request endpoint.
///
/// - **URL:** `/api/1/MaintenanceRequests`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// New requests start in the `new` stage unless one is given.
#[post("/1/MaintenanceRequests", data = "<new_request>")]
pub async fn create_maintenance_request(
    backend: &Backend,
    auth_user: AuthenticatedUser,
    new_request: LoggedJson<CreateMaintenanceRequest>,
) -> Result<status::Created<Json<EnrichedMaintenanceRequest>>, ApiError> {
    let new_request = new_request.into_inner();
    if new_request.subject.trim().is_empty() {
        return Err(api_error(Status::UnprocessableEntity, "Subject is required"));
    }

    let store = backend.store.as_ref();
    let bearer = auth_user.bearer();
    let created = insert_request(store, &bearer, &new_request.into_new(auth_user.user_id()))
        .await
        .map_err(|e| store_failure("Failed to create maintenance request", e))?;
    info!("{} created maintenance request {}", auth_user.session.email, created.id);

    let location = format!("/api/1/MaintenanceRequests/{}", created.id);
    let mut enriched = enrich_requests(store, &bearer, vec![created]).await;
    match enriched.pop() {
        Some(request) => Ok(status::Created::new(location).body(Json(request))),
        None => Err(api_error(Status::InternalServerError, "Created request was lost")),
    }
}

/// Update Maintenance Request endpoint.
///
/// - **URL:** `/api/1/MaintenanceRequests/<id>`
/// - **Method:** `PUT`
/// - **Authentication:** Required
///
/// Partial update: fields left out of the body keep their value, an
/// explicit `null` clears a nullable column.
#[put("/1/MaintenanceRequests/<id>", data = "<patch>")]
pub async fn update_maintenance_request(
    backend: &Backend,
    auth_user: AuthenticatedUser,
    id: i64,
    patch: LoggedJson<MaintenanceRequestPatch>,
) -> Result<Json<EnrichedMaintenanceRequest>, ApiError> {
    if patch.subject.as_deref().map(|s| s.trim().is_empty()).unwrap_or(false) {
        return Err(api_error(Status::UnprocessableEntity, "Subject cannot be blank"));
    }

    let store = backend.store.as_ref();
    let bearer = auth_user.bearer();
    let updated = match update_request(store, &bearer, id, &patch).await {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            return Err(api_error(
                Status::NotFound,
                format!("Maintenance request {} not found", id),
            ));
        }
        Err(e) => return Err(store_failure("Failed to update maintenance request", e)),
    };

    enrich_requests(store, &bearer, vec![updated])
        .await
        .pop()
        .map(Json)
        .ok_or_else(|| api_error(Status::InternalServerError, "Updated request was lost"))
}

/// Delete Maintenance Request endpoint.
///
/// - **URL:** `/api/1/MaintenanceRequests/<id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Required
///
/// Answers 204 when deleted, 404 when there was no such request.
#[delete("/1/MaintenanceRequests/<id>")]
pub async fn delete_maintenance_request(
    backend: &Backend,
    auth_user: AuthenticatedUser,
    id: i64,
) -> Result<Status, Status> {
    match delete_request(backend.store.as_ref(), &auth_user.bearer(), id).await {
        Ok(true) => {
            info!("{} deleted maintenance request {}", auth_user.session.email, id);
            Ok(Status::NoContent)
        }
        Ok(false) => Err(Status::NotFound),
        Err(e) => {
            error!("Failed to delete maintenance request {}: {}", id, e);
            Err(Status::from_code(e.http_status()).unwrap_or(Status::InternalServerError))
        }
    }
}

pub fn routes() -> Vec<Route> {
    routes![
        list_maintenance_requests,
        get_maintenance_request,
        create_maintenance_request,
        update_maintenance_request,
        delete_maintenance_request,
    ]
}
