//! Equipment reports and dashboard figures, computed from fetched rows.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::{Equipment, MaintenanceRequest, Profile, ProfileRole, WorkCenter};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Case-insensitive substring match on name or category. A blank search
/// matches everything.
pub fn matches_search(equipment: &Equipment, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    equipment.name.to_lowercase().contains(&needle)
        || equipment
            .category
            .as_deref()
            .map(|c| c.to_lowercase().contains(&needle))
            .unwrap_or(false)
}

/// Case-insensitive match on a work center's name, code or tag.
pub fn matches_work_center(center: &WorkCenter, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    needle.is_empty()
        || [Some(center.name.as_str()), center.code.as_deref(), center.tag.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
}

pub fn category_of(equipment: &Equipment) -> &str {
    equipment
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(UNCATEGORIZED)
}

/// Health clamped to 0..=100; unknown health counts as zero.
fn health_of(equipment: &Equipment) -> f64 {
    equipment.health_percentage.unwrap_or(0.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryCount {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryGroup {
    pub category: String,
    pub average_health: f64,
    pub items: Vec<Equipment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EquipmentReport {
    pub total: usize,
    pub counts: Vec<CategoryCount>,
    pub groups: Vec<CategoryGroup>,
}

/// Groups the equipment matching `search` by category. Groups are sorted by
/// category name and their members by equipment name.
pub fn equipment_report(equipment: Vec<Equipment>, search: &str) -> EquipmentReport {
    let mut groups: BTreeMap<String, Vec<Equipment>> = BTreeMap::new();
    let mut total = 0;
    for item in equipment.into_iter().filter(|e| matches_search(e, search)) {
        total += 1;
        groups.entry(category_of(&item).to_string()).or_default().push(item);
    }

    let groups: Vec<CategoryGroup> = groups
        .into_iter()
        .map(|(category, mut items)| {
            items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            let average_health = items.iter().map(health_of).sum::<f64>() / items.len().max(1) as f64;
            CategoryGroup {
                category,
                average_health: average_health.clamp(0.0, 100.0),
                items,
            }
        })
        .collect();

    EquipmentReport {
        total,
        counts: groups
            .iter()
            .map(|g| CategoryCount {
                name: g.category.clone(),
                value: g.items.len(),
            })
            .collect(),
        groups,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub open_requests: usize,
    pub overdue_requests: usize,
    pub critical_equipment: usize,
    pub technicians: usize,
    pub busy_technicians: usize,
    /// Share of technicians holding at least one open request, 0..=100.
    pub technician_load: u8,
}

pub fn dashboard_stats(
    requests: &[MaintenanceRequest],
    equipment: &[Equipment],
    people: &[Profile],
    now: DateTime<Utc>,
) -> DashboardStats {
    let open: Vec<&MaintenanceRequest> = requests.iter().filter(|r| r.is_open()).collect();
    let technicians: BTreeSet<&str> = people
        .iter()
        .filter(|p| p.role == Some(ProfileRole::Technician))
        .map(|p| p.id.as_str())
        .collect();
    let busy: BTreeSet<&str> = open
        .iter()
        .filter_map(|r| r.technician_id.as_deref())
        .filter(|id| technicians.contains(id))
        .collect();

    let technician_load = if technicians.is_empty() {
        0
    } else {
        ((busy.len() * 100) as f64 / technicians.len() as f64).round() as u8
    };

    DashboardStats {
        open_requests: open.len(),
        overdue_requests: open.iter().filter(|r| r.is_overdue(now)).count(),
        critical_equipment: equipment.iter().filter(|e| e.is_critical()).count(),
        technicians: technicians.len(),
        busy_technicians: busy.len(),
        technician_load,
    }
}
