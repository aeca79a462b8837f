use chrono::{Datelike, Utc};
use clap::Args;
use gearguard_api::{
    calendar::{CalendarEvent, CalendarGrid, CalendarMonth, TechnicianFilter, month_grid, technician_options},
    display::{or_dash, person_or_unassigned},
    enrichment::fetch_enriched_requests,
    store::{Bearer, RemoteStore, maintenance_request::RequestOrder},
};

#[derive(Args)]
pub struct CalendarArgs {
    #[arg(short, long, help = "Month to show as YYYY-MM (default: current month)")]
    pub month: Option<CalendarMonth>,
    #[arg(short, long, help = "Only show requests assigned to this technician")]
    pub technician: Option<String>,
}

pub async fn handle_calendar_command(
    store: &dyn RemoteStore,
    bearer: &Bearer,
    args: CalendarArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let today = Utc::now().date_naive();
    let month = args.month.unwrap_or_else(|| CalendarMonth::containing(today));
    let filter = TechnicianFilter::from(args.technician.as_deref());

    let requests = fetch_enriched_requests(store, bearer, RequestOrder::default()).await?;
    let events: Vec<CalendarEvent> = requests.iter().map(CalendarEvent::from).collect();
    let grid = month_grid(month, &events, &filter, today)
        .ok_or_else(|| format!("Month {} is outside the supported date range", month))?;

    for line in render_grid(&grid) {
        println!("{}", line);
    }
    println!();
    println!("Technician: {}", filter);
    let agenda = render_agenda(&grid);
    if agenda.is_empty() {
        println!("No scheduled maintenance this month.");
    } else {
        for line in agenda {
            println!("{}", line);
        }
    }
    println!();
    println!("Technicians: {}", technician_options(&events).join(", "));
    Ok(())
}

/// The month as a 7-column text grid. Days outside the month are blank,
/// days with work carry the number of requests, today is bracketed.
pub fn render_grid(grid: &CalendarGrid) -> Vec<String> {
    let mut lines = vec![
        format!("{:^42}", grid.label),
        ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
            .iter()
            .map(|d| format!("{:^6}", d))
            .collect(),
    ];
    for week in &grid.weeks {
        let line: String = week
            .iter()
            .map(|day| {
                if !day.in_month {
                    return " ".repeat(6);
                }
                let number = if day.is_today {
                    format!("[{}]", day.date.day())
                } else {
                    day.date.day().to_string()
                };
                let marker = match day.events.len() {
                    0 => String::new(),
                    n => format!("+{}", n),
                };
                format!("{:^6}", format!("{}{}", number, marker))
            })
            .collect();
        lines.push(line.trim_end().to_string());
    }
    lines
}

/// One line per scheduled request in the month, by day.
pub fn render_agenda(grid: &CalendarGrid) -> Vec<String> {
    grid.days()
        .filter(|day| day.in_month)
        .flat_map(|day| {
            day.events.iter().map(move |event| {
                format!(
                    "  {} {} | {} | {}",
                    day.date.format("%a %d"),
                    event.subject,
                    or_dash(event.equipment_name.as_deref()),
                    person_or_unassigned(event.technician_name.as_deref()),
                )
            })
        })
        .collect()
}
