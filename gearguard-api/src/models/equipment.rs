use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::ProfileId;

/// A row of the `equipment` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub employee: Option<String>,
    #[serde(default)]
    pub technician_id: Option<ProfileId>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub health_percentage: Option<f64>,
}

/// The two columns the enrichment lookup selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EquipmentLabel {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl Equipment {
    /// Equipment below this health percentage is reported as critical.
    pub const CRITICAL_HEALTH: f64 = 30.0;

    pub fn is_critical(&self) -> bool {
        self.health_percentage
            .map(|h| h < Self::CRITICAL_HEALTH)
            .unwrap_or(false)
    }
}
