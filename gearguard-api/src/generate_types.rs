//! TypeScript bindings for the view layer.
//!
//! Running the tests writes a `.ts` file for every type annotated with
//! `#[ts(export)]` into the chosen output directory.

#[cfg(test)]
mod tests {
    use std::{env, path::Path};

    use ts_rs::TS;

    #[test]
    fn generate_typescript_types() {
        // GEARGUARD_TS_OUTPUT_DIR wins, otherwise ../ts-bindings.
        let output_dir_str = env::var("GEARGUARD_TS_OUTPUT_DIR").unwrap_or_else(|_| "../ts-bindings".to_string());
        println!("Writing TypeScript types to {}", output_dir_str);
        let output_dir = Path::new(&output_dir_str);

        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir).expect("Failed to create output directory");
        }

        // Stale bindings for renamed or removed types would linger otherwise.
        for entry in std::fs::read_dir(output_dir).expect("Failed to read output directory") {
            let path = entry.expect("Failed to read directory entry").path();
            if path.extension().and_then(|s| s.to_str()) == Some("ts") {
                std::fs::remove_file(&path).unwrap_or_else(|e| panic!("Failed to remove {:?}: {}", path, e));
            }
        }

        unsafe {
            env::set_var("TS_RS_EXPORT_DIR", output_dir);
        }

        use crate::{
            api::{
                ErrorResponse,
                calendar::CalendarResponse,
                dashboard::{ActiveRequestRow, DashboardResponse},
                equipment::EquipmentList,
                login::LoginSuccessResponse,
                maintenance_request::{CreateMaintenanceRequest, MaintenanceRequestList},
                profile::UpdateProfileRequest,
                status::HealthStatus,
            },
            auth::{LoginRequest, SignupOutcome, SignupRequest},
            calendar::{CalendarDay, CalendarEvent, CalendarGrid, CalendarMonth},
            models::*,
            reporting::{CategoryCount, CategoryGroup, DashboardStats, EquipmentReport},
        };

        // Records
        MaintenanceRequest::export().expect("Failed to export MaintenanceRequest type");
        NewMaintenanceRequest::export().expect("Failed to export NewMaintenanceRequest type");
        MaintenanceRequestPatch::export().expect("Failed to export MaintenanceRequestPatch type");
        EnrichedMaintenanceRequest::export().expect("Failed to export EnrichedMaintenanceRequest type");
        Stage::export().expect("Failed to export Stage type");
        Priority::export().expect("Failed to export Priority type");
        RequestType::export().expect("Failed to export RequestType type");
        Equipment::export().expect("Failed to export Equipment type");
        EquipmentLabel::export().expect("Failed to export EquipmentLabel type");
        Profile::export().expect("Failed to export Profile type");
        ProfileRole::export().expect("Failed to export ProfileRole type");
        ProfileSummary::export().expect("Failed to export ProfileSummary type");
        ProfileInput::export().expect("Failed to export ProfileInput type");
        Team::export().expect("Failed to export Team type");
        TeamWithMembers::export().expect("Failed to export TeamWithMembers type");
        WorkCenter::export().expect("Failed to export WorkCenter type");

        // Views
        CalendarMonth::export().expect("Failed to export CalendarMonth type");
        CalendarEvent::export().expect("Failed to export CalendarEvent type");
        CalendarDay::export().expect("Failed to export CalendarDay type");
        CalendarGrid::export().expect("Failed to export CalendarGrid type");
        CategoryCount::export().expect("Failed to export CategoryCount type");
        CategoryGroup::export().expect("Failed to export CategoryGroup type");
        EquipmentReport::export().expect("Failed to export EquipmentReport type");
        DashboardStats::export().expect("Failed to export DashboardStats type");

        // Requests and responses
        ErrorResponse::export().expect("Failed to export ErrorResponse type");
        LoginRequest::export().expect("Failed to export LoginRequest type");
        LoginSuccessResponse::export().expect("Failed to export LoginSuccessResponse type");
        SignupRequest::export().expect("Failed to export SignupRequest type");
        SignupOutcome::export().expect("Failed to export SignupOutcome type");
        UpdateProfileRequest::export().expect("Failed to export UpdateProfileRequest type");
        CreateMaintenanceRequest::export().expect("Failed to export CreateMaintenanceRequest type");
        MaintenanceRequestList::export().expect("Failed to export MaintenanceRequestList type");
        EquipmentList::export().expect("Failed to export EquipmentList type");
        CalendarResponse::export().expect("Failed to export CalendarResponse type");
        ActiveRequestRow::export().expect("Failed to export ActiveRequestRow type");
        DashboardResponse::export().expect("Failed to export DashboardResponse type");
        HealthStatus::export().expect("Failed to export HealthStatus type");

        println!("TypeScript types written to {:?}", output_dir);
    }
}
