//! Health check endpoint.

use rocket::{Route, State, serde::json::Json};
use serde::Serialize;
use ts_rs::TS;

use crate::session::SessionRegistry;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct HealthStatus {
    status: &'static str,
    version: &'static str,
    built: &'static str,
    git_commit: Option<&'static str>,
    open_sessions: usize,
}

/// Health Status endpoint.
///
/// - **URL:** `/api/1/status`
/// - **Method:** `GET`
/// - **Authentication:** None required
///
/// ```json
/// {
///   "status": "running",
///   "version": "0.1.0",
///   "built": "Sat, 15 Mar 2025 18:13:43 +0000",
///   "git_commit": "cd51275141a2e7d49737aa7dd4e8ff7c9a804d67",
///   "open_sessions": 3
/// }
/// ```
#[get("/1/status")]
pub async fn health_status(registry: &State<SessionRegistry>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
        built: built_info::BUILT_TIME_UTC,
        git_commit: built_info::GIT_COMMIT_HASH,
        open_sessions: registry.len().await,
    })
}

pub fn routes() -> Vec<Route> {
    routes![health_status]
}
