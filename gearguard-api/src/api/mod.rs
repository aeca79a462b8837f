pub mod calendar;
pub mod dashboard;
pub mod equipment;
pub mod login;
pub mod logout;
pub mod maintenance_request;
pub mod profile;
pub mod signup;
pub mod status;
pub mod team;
pub mod work_center;

use rocket::Route;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::store::StoreError;

/// Body of every JSON error answered by a route.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = Custom<Json<ErrorResponse>>;

pub fn api_error(status: Status, message: impl Into<String>) -> ApiError {
    Custom(
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Logs a store failure and turns it into the matching HTTP answer.
pub fn store_failure(what: &str, e: StoreError) -> ApiError {
    error!("{}: {}", what, e);
    let status = Status::from_code(e.http_status()).unwrap_or(Status::InternalServerError);
    api_error(status, what)
}

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(calendar::routes());
    routes.extend(dashboard::routes());
    routes.extend(equipment::routes());
    routes.extend(login::routes());
    routes.extend(logout::routes());
    routes.extend(maintenance_request::routes());
    routes.extend(profile::routes());
    routes.extend(signup::routes());
    routes.extend(status::routes());
    routes.extend(team::routes());
    routes.extend(work_center::routes());
    routes
}
