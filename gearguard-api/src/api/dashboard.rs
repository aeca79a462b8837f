//! Dashboard endpoint: headline figures plus the active maintenance table.

use chrono::Utc;
use rocket::Route;
use rocket::serde::json::Json;
use rocket::tokio;
use serde::Serialize;
use ts_rs::TS;

use crate::api::{ApiError, store_failure};
use crate::backend::Backend;
use crate::display::{or_dash, person_or_unassigned};
use crate::enrichment::enrich_requests;
use crate::models::{EnrichedMaintenanceRequest, ProfileRole, Stage};
use crate::reporting::{DashboardStats, dashboard_stats};
use crate::session_guards::AuthenticatedUser;
use crate::store::equipment::list_equipment;
use crate::store::maintenance_request::{RequestOrder, list_requests};
use crate::store::profile::profiles_with_role;

const ACTIVE_ROWS: usize = 10;

/// One line of the active maintenance table, ready to print.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ActiveRequestRow {
    pub id: i64,
    pub subject: String,
    pub equipment: String,
    pub category: String,
    pub technician: String,
    pub requested_by: String,
    pub stage: String,
    pub priority: u8,
}

impl From<&EnrichedMaintenanceRequest> for ActiveRequestRow {
    fn from(r: &EnrichedMaintenanceRequest) -> Self {
        ActiveRequestRow {
            id: r.request.id,
            subject: r.request.subject.clone(),
            equipment: or_dash(r.equipment_name.as_deref()).to_string(),
            category: or_dash(r.equipment_category.as_deref()).to_string(),
            technician: person_or_unassigned(r.technician_name.as_deref()).to_string(),
            requested_by: or_dash(r.creator_name.as_deref()).to_string(),
            stage: Stage::label_for(r.request.stage).to_string(),
            priority: r.request.priority.map(|p| p.stars()).unwrap_or(0),
        }
    }
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct DashboardResponse {
    pub name: String,
    pub stats: DashboardStats,
    pub active: Vec<ActiveRequestRow>,
}

/// Dashboard endpoint.
///
/// - **URL:** `/api/1/Dashboard`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Requests, equipment and technicians are fetched concurrently. Only the
/// newest open requests shown in the table are enriched.
#[get("/1/Dashboard")]
pub async fn get_dashboard(
    backend: &Backend,
    auth_user: AuthenticatedUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let store = backend.store.as_ref();
    let bearer = auth_user.bearer();

    let (requests, equipment, technicians) = tokio::join!(
        list_requests(store, &bearer, RequestOrder::default()),
        list_equipment(store, &bearer),
        profiles_with_role(store, &bearer, ProfileRole::Technician),
    );
    let requests = requests.map_err(|e| store_failure("Failed to load maintenance requests", e))?;
    let equipment = equipment.map_err(|e| store_failure("Failed to load equipment", e))?;
    let technicians = technicians.unwrap_or_else(|e| {
        warn!("Technician lookup failed, load shown as zero: {}", e);
        Vec::new()
    });

    let stats = dashboard_stats(&requests, &equipment, &technicians, Utc::now());
    let open: Vec<_> = requests
        .into_iter()
        .filter(|r| r.is_open())
        .take(ACTIVE_ROWS)
        .collect();
    let active = enrich_requests(store, &bearer, open).await;

    Ok(Json(DashboardResponse {
        name: auth_user.session.name().to_string(),
        stats,
        active: active.iter().map(ActiveRequestRow::from).collect(),
    }))
}

pub fn routes() -> Vec<Route> {
    routes![get_dashboard]
}
