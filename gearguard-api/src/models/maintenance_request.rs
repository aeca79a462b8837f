use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::ProfileId;

/// Workflow status of a maintenance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Stage {
    New,
    InProgress,
    Repaired,
    Done,
    Scrap,
    #[serde(other)]
    Unknown,
}

impl Stage {
    /// Label shown in tables and the stage pipeline.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::New => "New Request",
            Stage::InProgress => "In Progress",
            Stage::Repaired => "Repaired",
            Stage::Done => "Done",
            Stage::Scrap => "Scrap",
            Stage::Unknown => "Unknown",
        }
    }

    /// Closed requests no longer count as open work.
    pub fn is_closed(&self) -> bool {
        matches!(self, Stage::Repaired | Stage::Done | Stage::Scrap)
    }

    /// Label for an optional stage; requests without one are drafts.
    pub fn label_for(stage: Option<Stage>) -> &'static str {
        stage.map(|s| s.label()).unwrap_or("Draft")
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "new" | "new_request" => Ok(Stage::New),
            "in_progress" => Ok(Stage::InProgress),
            "repaired" => Ok(Stage::Repaired),
            "done" => Ok(Stage::Done),
            "scrap" => Ok(Stage::Scrap),
            other => Err(format!("unknown stage '{}'", other)),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Priority as stored by the request form. The star widget writes
/// "1".."3", which map onto the named levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Priority {
    #[serde(alias = "1")]
    Low,
    #[serde(alias = "2")]
    Medium,
    #[serde(alias = "3")]
    High,
    #[serde(other)]
    Unknown,
}

impl Priority {
    pub fn stars(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Unknown => 0,
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "1" => Ok(Priority::Low),
            "medium" | "2" => Ok(Priority::Medium),
            "high" | "3" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RequestType {
    Corrective,
    Preventive,
}

impl RequestType {
    pub fn label(&self) -> &'static str {
        match self {
            RequestType::Corrective => "Corrective",
            RequestType::Preventive => "Preventive",
        }
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "corrective" => Ok(RequestType::Corrective),
            "preventive" => Ok(RequestType::Preventive),
            other => Err(format!("unknown request type '{}'", other)),
        }
    }
}

/// A row of the `maintenance_requests` table.
///
/// Every reference to another entity is optional; timestamps are
/// `timestamptz` columns and arrive as RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaintenanceRequest {
    pub id: i64,
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: Option<ProfileId>,
    #[serde(default)]
    pub technician_id: Option<ProfileId>,
    #[serde(default)]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub equipment_id: Option<i64>,
    #[serde(default)]
    pub work_center_id: Option<i64>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub request_type: Option<RequestType>,
    #[serde(default)]
    pub stage: Option<Stage>,
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    /// A request is open until it reaches a closed stage. Drafts count as open.
    pub fn is_open(&self) -> bool {
        !self.stage.map(|s| s.is_closed()).unwrap_or(false)
    }

    /// Open requests whose scheduled date already passed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.scheduled_date.map(|d| d < now).unwrap_or(false)
    }
}

/// Insert payload for a maintenance request. `created_by` is filled in
/// from the caller's session, never from the request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMaintenanceRequest {
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ProfileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician_id: Option<ProfileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_center_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<RequestType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

/// Reads a present field as `Some`, so `null` becomes `Some(None)` and a
/// missing field stays `None` through `#[serde(default)]`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update for a maintenance request.
///
/// Nullable columns are tri-state: `None` leaves the column alone,
/// `Some(None)` clears it and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaintenanceRequestPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub technician_id: Option<Option<ProfileId>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub scheduled_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub duration_hours: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub equipment_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub work_center_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub priority: Option<Option<Priority>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub request_type: Option<Option<RequestType>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub stage: Option<Option<Stage>>,
}

impl MaintenanceRequestPatch {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.description.is_none()
            && self.technician_id.is_none()
            && self.scheduled_date.is_none()
            && self.duration_hours.is_none()
            && self.equipment_id.is_none()
            && self.work_center_id.is_none()
            && self.priority.is_none()
            && self.request_type.is_none()
            && self.stage.is_none()
    }
}

/// A maintenance request with the names of the entities it references.
/// Derived on every fetch, never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EnrichedMaintenanceRequest {
    #[serde(flatten)]
    pub request: MaintenanceRequest,
    pub equipment_name: Option<String>,
    pub equipment_category: Option<String>,
    pub creator_name: Option<String>,
    pub technician_name: Option<String>,
}
