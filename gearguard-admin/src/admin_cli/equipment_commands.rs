use clap::Subcommand;
use gearguard_api::{
    display::or_dash,
    models::Equipment,
    reporting::{EquipmentReport, equipment_report},
    store::{Bearer, RemoteStore, equipment::list_equipment},
};

use super::utils::Matcher;

#[derive(Subcommand)]
pub enum EquipmentAction {
    #[command(about = "List equipment, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term matched against name and category (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
    },
    #[command(about = "Equipment by category with average health")]
    Report {
        #[arg(help = "Case-insensitive search over name and category")]
        search: Option<String>,
    },
}

pub async fn handle_equipment_command(
    store: &dyn RemoteStore,
    bearer: &Bearer,
    action: EquipmentAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        EquipmentAction::Ls { search_term, fixed_string } => {
            let matcher = Matcher::new(search_term.as_deref(), fixed_string)?;
            let equipment: Vec<Equipment> = list_equipment(store, bearer)
                .await?
                .into_iter()
                .filter(|e| matcher.any([Some(e.name.as_str()), e.category.as_deref()]))
                .collect();

            if equipment.is_empty() {
                println!("No equipment found.");
            } else {
                println!("Equipment:");
                for item in &equipment {
                    println!("  {}", equipment_line(item));
                }
            }
        }
        EquipmentAction::Report { search } => {
            let equipment = list_equipment(store, bearer).await?;
            let report = equipment_report(equipment, search.as_deref().unwrap_or_default());
            for line in render_report(&report) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn health_label(health: Option<f64>) -> String {
    health
        .map(|h| format!("{:.0}%", h.clamp(0.0, 100.0)))
        .unwrap_or_else(|| or_dash(None).to_string())
}

pub fn equipment_line(item: &Equipment) -> String {
    format!(
        "ID: {}, Name: {}, Category: {}, Serial: {}, Health: {}{}",
        item.id,
        item.name,
        or_dash(item.category.as_deref()),
        or_dash(item.serial_number.as_deref()),
        health_label(item.health_percentage),
        if item.is_critical() { " (critical)" } else { "" },
    )
}

pub fn render_report(report: &EquipmentReport) -> Vec<String> {
    if report.total == 0 {
        return vec!["No equipment found.".to_string()];
    }
    let mut lines = vec![format!("{} items", report.total)];
    for group in &report.groups {
        lines.push(format!(
            "{} ({}) average health {:.0}%",
            group.category,
            group.items.len(),
            group.average_health
        ));
        for item in &group.items {
            lines.push(format!("  {} {}", item.name, health_label(item.health_percentage)));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearguard_api::store::MemoryStore;

    #[tokio::test]
    async fn report_lines() {
        let store = MemoryStore::seeded();
        let equipment = list_equipment(&store, &Bearer::anonymous()).await.unwrap();
        let lines = render_report(&equipment_report(equipment, ""));

        assert_eq!(lines[0], "5 items");
        assert!(lines.contains(&"Machinery (2) average health 53%".to_string()));
        assert!(lines.contains(&"  CNC Lathe 24%".to_string()));
        assert!(lines.contains(&"Uncategorized (1) average health 91%".to_string()));
    }

    #[test]
    fn empty_report() {
        let lines = render_report(&equipment_report(Vec::new(), "anything"));
        assert_eq!(lines, vec!["No equipment found.".to_string()]);
    }

    #[tokio::test]
    async fn critical_equipment_is_flagged() {
        let store = MemoryStore::seeded();
        let equipment = list_equipment(&store, &Bearer::anonymous()).await.unwrap();
        let lathe = equipment.iter().find(|e| e.id == 12).unwrap();
        assert_eq!(
            equipment_line(lathe),
            "ID: 12, Name: CNC Lathe, Category: Machinery, Serial: CNC-0042, Health: 24% (critical)"
        );
    }
}
