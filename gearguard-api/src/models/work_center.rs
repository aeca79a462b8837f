use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A row of the `work_centers` table: a production resource grouping with
/// cost, capacity and efficiency attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WorkCenter {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub alternative_workcenters: Option<String>,
    #[serde(default)]
    pub cost_per_hour: Option<f64>,
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub time_efficiency: Option<f64>,
    #[serde(default)]
    pub oee_target: Option<f64>,
}
