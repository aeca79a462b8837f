use clap::Subcommand;
use gearguard_api::{
    display::or_dash,
    models::WorkCenter,
    store::{Bearer, RemoteStore, work_center::list_work_centers},
};

use super::utils::Matcher;

#[derive(Subcommand)]
pub enum WorkCenterAction {
    #[command(about = "List work centers, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term matched against name, code and tag (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
    },
}

pub async fn handle_work_center_command(
    store: &dyn RemoteStore,
    bearer: &Bearer,
    action: WorkCenterAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WorkCenterAction::Ls { search_term, fixed_string } => {
            let matcher = Matcher::new(search_term.as_deref(), fixed_string)?;
            let centers = work_center_ls_impl(store, bearer, &matcher).await?;
            if centers.is_empty() {
                println!("No work centers found.");
            } else {
                println!("Work centers:");
                for center in &centers {
                    println!("  {}", work_center_line(center));
                }
            }
        }
    }
    Ok(())
}

pub async fn work_center_ls_impl(
    store: &dyn RemoteStore,
    bearer: &Bearer,
    matcher: &Matcher,
) -> Result<Vec<WorkCenter>, Box<dyn std::error::Error>> {
    Ok(list_work_centers(store, bearer)
        .await?
        .into_iter()
        .filter(|c| matcher.any([Some(c.name.as_str()), c.code.as_deref(), c.tag.as_deref()]))
        .collect())
}

fn number(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| or_dash(None).to_string())
}

pub fn work_center_line(center: &WorkCenter) -> String {
    format!(
        "ID: {}, Name: {}, Code: {}, Tag: {}, Cost/h: {}, Capacity: {}, Efficiency: {}, OEE target: {}",
        center.id,
        center.name,
        or_dash(center.code.as_deref()),
        or_dash(center.tag.as_deref()),
        number(center.cost_per_hour),
        number(center.capacity),
        number(center.time_efficiency),
        number(center.oee_target),
    )
}
