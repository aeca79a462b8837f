use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Subcommand, ValueEnum};
use gearguard_api::{
    display::{MISSING, or_dash, person_or_unassigned},
    enrichment::{enrich_requests, fetch_enriched_request, fetch_enriched_requests},
    models::{EnrichedMaintenanceRequest, MaintenanceRequestPatch, NewMaintenanceRequest, Priority, RequestType, Stage},
    store::{
        Bearer, RemoteStore,
        maintenance_request::{RequestOrder, delete_request, insert_request, update_request},
    },
};

use super::utils::{Matcher, StoredSession, confirm};

#[derive(Subcommand)]
pub enum RequestAction {
    #[command(about = "List maintenance requests, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term matched against subject, equipment and technician (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
        #[arg(long, help = "Sort order, e.g. scheduled_date.asc (default created_at.desc)")]
        order: Option<RequestOrder>,
    },
    #[command(about = "Show one maintenance request")]
    Show {
        #[arg(help = "Request ID")]
        id: i64,
    },
    #[command(about = "Create a maintenance request")]
    Create {
        #[arg(short, long, help = "Subject")]
        subject: String,
        #[command(flatten)]
        fields: RequestFields,
    },
    #[command(about = "Edit maintenance request fields")]
    Edit {
        #[arg(help = "Request ID to edit")]
        id: i64,
        #[arg(short, long, help = "New subject")]
        subject: Option<String>,
        #[command(flatten)]
        fields: RequestFields,
        #[arg(long, value_enum, help = "Clear a field (repeatable), e.g. --clear technician")]
        clear: Vec<ClearField>,
    },
    #[command(about = "Remove a maintenance request")]
    Rm {
        #[arg(help = "Request ID to remove")]
        id: i64,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
}

/// Optional fields shared by `create` and `edit`.
#[derive(Args, Default)]
pub struct RequestFields {
    #[arg(short, long, help = "Description")]
    pub description: Option<String>,
    #[arg(short, long, help = "Equipment ID")]
    pub equipment_id: Option<i64>,
    #[arg(long, help = "Work center ID")]
    pub work_center_id: Option<i64>,
    #[arg(short, long, help = "Technician profile ID")]
    pub technician_id: Option<String>,
    #[arg(long, value_parser = parse_schedule, help = "Scheduled date (YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339, UTC)")]
    pub scheduled: Option<DateTime<Utc>>,
    #[arg(long, help = "Duration in hours")]
    pub duration: Option<f64>,
    #[arg(short, long, help = "Priority: low, medium or high")]
    pub priority: Option<Priority>,
    #[arg(long = "type", help = "Request type: corrective or preventive")]
    pub request_type: Option<RequestType>,
    #[arg(long, help = "Stage: new, in_progress, repaired, done or scrap")]
    pub stage: Option<Stage>,
}

/// Nullable request fields `edit --clear` can empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClearField {
    Description,
    Technician,
    Equipment,
    WorkCenter,
    Scheduled,
    Duration,
    Priority,
    Type,
    Stage,
}

/// Maps one edit flag and its `--clear` onto a tri-state patch field.
fn set_or_clear<T>(value: Option<T>, clear: bool, flag: &str) -> Result<Option<Option<T>>, String> {
    match (value, clear) {
        (Some(_), true) => Err(format!("Cannot both set and clear {}", flag)),
        (Some(v), false) => Ok(Some(Some(v))),
        (None, true) => Ok(Some(None)),
        (None, false) => Ok(None),
    }
}

impl RequestFields {
    fn into_patch(self, subject: Option<String>, clear: &[ClearField]) -> Result<MaintenanceRequestPatch, String> {
        let cleared = |field: ClearField| clear.contains(&field);
        Ok(MaintenanceRequestPatch {
            subject,
            description: set_or_clear(self.description, cleared(ClearField::Description), "description")?,
            technician_id: set_or_clear(self.technician_id, cleared(ClearField::Technician), "technician")?,
            scheduled_date: set_or_clear(self.scheduled, cleared(ClearField::Scheduled), "scheduled")?,
            duration_hours: set_or_clear(self.duration, cleared(ClearField::Duration), "duration")?,
            equipment_id: set_or_clear(self.equipment_id, cleared(ClearField::Equipment), "equipment")?,
            work_center_id: set_or_clear(self.work_center_id, cleared(ClearField::WorkCenter), "work center")?,
            priority: set_or_clear(self.priority, cleared(ClearField::Priority), "priority")?,
            request_type: set_or_clear(self.request_type, cleared(ClearField::Type), "type")?,
            stage: set_or_clear(self.stage, cleared(ClearField::Stage), "stage")?,
        })
    }
}

pub fn parse_schedule(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Ok(at.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| format!("'{}' is not a date (expected YYYY-MM-DD)", value))
}

pub async fn handle_request_command(
    store: &dyn RemoteStore,
    session: &StoredSession,
    action: RequestAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let bearer = session.bearer();
    match action {
        RequestAction::Ls { search_term, fixed_string, order } => {
            let matcher = Matcher::new(search_term.as_deref(), fixed_string)?;
            let requests = request_ls_impl(store, &bearer, &matcher, order.unwrap_or_default()).await?;
            if requests.is_empty() {
                println!("No maintenance requests found.");
            } else {
                println!("Maintenance requests:");
                for request in &requests {
                    println!("  {}", request_line(request));
                }
            }
        }
        RequestAction::Show { id } => match fetch_enriched_request(store, &bearer, id).await? {
            Some(request) => {
                for line in request_details(&request) {
                    println!("{}", line);
                }
            }
            None => return Err(format!("Maintenance request {} does not exist", id).into()),
        },
        RequestAction::Create { subject, fields } => {
            let created = request_create_impl(store, &bearer, &session.user_id, subject, fields).await?;
            println!("Maintenance request created successfully!");
            println!("  {}", request_line(&created));
        }
        RequestAction::Edit { id, subject, fields, clear } => {
            let updated = request_edit_impl(store, &bearer, id, subject, fields, &clear).await?;
            println!("Maintenance request updated successfully!");
            println!("  {}", request_line(&updated));
        }
        RequestAction::Rm { id, yes } => {
            if !yes && !confirm(&format!("Remove maintenance request {}?", id))? {
                println!("Removal cancelled.");
                return Ok(());
            }
            if delete_request(store, &bearer, id).await? {
                println!("Removed maintenance request {}.", id);
            } else {
                return Err(format!("Maintenance request {} does not exist", id).into());
            }
        }
    }
    Ok(())
}

pub async fn request_ls_impl(
    store: &dyn RemoteStore,
    bearer: &Bearer,
    matcher: &Matcher,
    order: RequestOrder,
) -> Result<Vec<EnrichedMaintenanceRequest>, Box<dyn std::error::Error>> {
    let requests = fetch_enriched_requests(store, bearer, order).await?;
    Ok(requests
        .into_iter()
        .filter(|r| {
            matcher.any([
                Some(r.request.subject.as_str()),
                r.equipment_name.as_deref(),
                r.technician_name.as_deref(),
            ])
        })
        .collect())
}

pub async fn request_create_impl(
    store: &dyn RemoteStore,
    bearer: &Bearer,
    created_by: &str,
    subject: String,
    fields: RequestFields,
) -> Result<EnrichedMaintenanceRequest, Box<dyn std::error::Error>> {
    let subject = subject.trim().to_string();
    if subject.is_empty() {
        return Err("Subject is required".into());
    }
    let new_request = NewMaintenanceRequest {
        subject,
        description: fields.description,
        created_by: Some(created_by.to_string()),
        technician_id: fields.technician_id,
        scheduled_date: fields.scheduled,
        duration_hours: fields.duration,
        equipment_id: fields.equipment_id,
        work_center_id: fields.work_center_id,
        priority: fields.priority,
        request_type: fields.request_type,
        stage: fields.stage.or(Some(Stage::New)),
    };
    let created = insert_request(store, bearer, &new_request).await?;
    enrich_requests(store, bearer, vec![created])
        .await
        .pop()
        .ok_or_else(|| "Created request was not returned".into())
}

pub async fn request_edit_impl(
    store: &dyn RemoteStore,
    bearer: &Bearer,
    id: i64,
    subject: Option<String>,
    fields: RequestFields,
    clear: &[ClearField],
) -> Result<EnrichedMaintenanceRequest, Box<dyn std::error::Error>> {
    let subject = subject.map(|s| s.trim().to_string());
    if subject.as_deref() == Some("") {
        return Err("Subject cannot be blank".into());
    }
    let patch = fields.into_patch(subject, clear)?;
    if patch.is_empty() {
        return Err("Nothing to change. Pass at least one field to edit.".into());
    }
    let updated = update_request(store, bearer, id, &patch)
        .await?
        .ok_or_else(|| format!("Maintenance request {} does not exist", id))?;
    enrich_requests(store, bearer, vec![updated])
        .await
        .pop()
        .ok_or_else(|| "Updated request was not returned".into())
}

fn schedule_label(at: Option<DateTime<Utc>>) -> String {
    at.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "Unscheduled".to_string())
}

pub fn request_line(r: &EnrichedMaintenanceRequest) -> String {
    format!(
        "#{} {} | {} | {} | {} | {}",
        r.request.id,
        r.request.subject,
        or_dash(r.equipment_name.as_deref()),
        person_or_unassigned(r.technician_name.as_deref()),
        Stage::label_for(r.request.stage),
        schedule_label(r.request.scheduled_date),
    )
}

pub fn request_details(r: &EnrichedMaintenanceRequest) -> Vec<String> {
    let request = &r.request;
    vec![
        format!("Request #{}: {}", request.id, request.subject),
        format!("  Description: {}", or_dash(request.description.as_deref())),
        format!(
            "  Equipment: {} ({})",
            or_dash(r.equipment_name.as_deref()),
            or_dash(r.equipment_category.as_deref())
        ),
        format!("  Technician: {}", person_or_unassigned(r.technician_name.as_deref())),
        format!("  Requested by: {}", or_dash(r.creator_name.as_deref())),
        format!("  Stage: {}", Stage::label_for(request.stage)),
        format!(
            "  Priority: {}",
            request.priority.map(|p| "*".repeat(p.stars() as usize)).unwrap_or_default()
        ),
        format!("  Type: {}", or_dash(request.request_type.map(|t| t.label()))),
        format!("  Scheduled: {}", schedule_label(request.scheduled_date)),
        format!(
            "  Duration: {}",
            request.duration_hours.map(|h| format!("{} h", h)).unwrap_or_else(|| MISSING.to_string())
        ),
        format!("  Created: {}", request.created_at.format("%Y-%m-%d %H:%M")),
    ]
}
