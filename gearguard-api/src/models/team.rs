use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::ProfileSummary;

/// A row of the `teams` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
}

/// A team with the profiles whose `team_id` points at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TeamWithMembers {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<ProfileSummary>,
}
