//! Maintenance calendar endpoint.

use chrono::Utc;
use rocket::Route;
use rocket::http::Status;
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::api::{ApiError, api_error, store_failure};
use crate::backend::Backend;
use crate::calendar::{
    CalendarEvent, CalendarGrid, CalendarMonth, TechnicianFilter, month_grid, technician_options,
};
use crate::enrichment::fetch_enriched_requests;
use crate::session_guards::AuthenticatedUser;
use crate::store::maintenance_request::RequestOrder;

#[derive(Serialize, TS)]
#[ts(export)]
pub struct CalendarResponse {
    pub grid: CalendarGrid,
    pub technician: String,
    pub technicians: Vec<String>,
    pub prev: CalendarMonth,
    pub next: CalendarMonth,
}

/// Calendar endpoint.
///
/// - **URL:** `/api/1/Calendar?year=2025&month=3&technician=Sarah%20Chen`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Defaults to the current month and to all technicians. The technician
/// choices list every technician that has a request, whatever the month.
#[get("/1/Calendar?<year>&<month>&<technician>")]
pub async fn get_calendar(
    backend: &Backend,
    auth_user: AuthenticatedUser,
    year: Option<i32>,
    month: Option<u32>,
    technician: Option<&str>,
) -> Result<Json<CalendarResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let current = CalendarMonth::containing(today);
    let out_of_range = || api_error(Status::BadRequest, "Month must be between 1 and 12 of a supported year");
    let shown = CalendarMonth::new(year.unwrap_or(current.year), month.unwrap_or(current.month))
        .ok_or_else(out_of_range)?;
    let filter = TechnicianFilter::from(technician);

    let requests = fetch_enriched_requests(backend.store.as_ref(), &auth_user.bearer(), RequestOrder::default())
        .await
        .map_err(|e| store_failure("Failed to load maintenance requests", e))?;
    let events: Vec<CalendarEvent> = requests.iter().map(CalendarEvent::from).collect();
    let grid = month_grid(shown, &events, &filter, today).ok_or_else(out_of_range)?;

    Ok(Json(CalendarResponse {
        grid,
        technician: filter.to_string(),
        technicians: technician_options(&events),
        prev: shown.prev(),
        next: shown.next(),
    }))
}

pub fn routes() -> Vec<Route> {
    routes![get_calendar]
}
