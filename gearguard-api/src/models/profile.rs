use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identifier of a person. The auth service issues UUIDs, but the value is
/// treated as opaque text.
pub type ProfileId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ProfileRole {
    Manager,
    Technician,
    Employee,
    #[serde(other)]
    Unknown,
}

impl FromStr for ProfileRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manager" => Ok(ProfileRole::Manager),
            "technician" => Ok(ProfileRole::Technician),
            "employee" => Ok(ProfileRole::Employee),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl fmt::Display for ProfileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileRole::Manager => "manager",
            ProfileRole::Technician => "technician",
            ProfileRole::Employee => "employee",
            ProfileRole::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A row of the `profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Profile {
    pub id: ProfileId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<ProfileRole>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
}

/// Id and display name, as selected by the person lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfileSummary {
    pub id: ProfileId,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Row written when an account signs up or edits its profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfileInput {
    pub id: ProfileId,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<ProfileRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
