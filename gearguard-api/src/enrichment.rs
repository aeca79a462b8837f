//! Turns raw maintenance request rows into display-ready records.
//!
//! A fetch is one base query plus at most two batched lookups (equipment
//! and people), which run concurrently. The lookups are keyed by the
//! deduplicated ids the rows reference, so the number of round trips does
//! not grow with the number of requests. A failed lookup only blanks the
//! fields it would have filled.

use std::collections::{BTreeSet, HashMap};

use rocket::tokio;

use crate::models::{EnrichedMaintenanceRequest, EquipmentLabel, MaintenanceRequest, ProfileId};
use crate::store::equipment::equipment_labels;
use crate::store::maintenance_request::{RequestOrder, get_request, list_requests};
use crate::store::profile::profile_names;
use crate::store::{Bearer, RemoteStore, StoreError};

/// All requests, ordered, with related names resolved.
pub async fn fetch_enriched_requests(
    store: &dyn RemoteStore,
    auth: &Bearer,
    order: RequestOrder,
) -> Result<Vec<EnrichedMaintenanceRequest>, StoreError> {
    let rows = list_requests(store, auth, order).await?;
    Ok(enrich_requests(store, auth, rows).await)
}

/// One request by id, with related names resolved.
pub async fn fetch_enriched_request(
    store: &dyn RemoteStore,
    auth: &Bearer,
    id: i64,
) -> Result<Option<EnrichedMaintenanceRequest>, StoreError> {
    match get_request(store, auth, id).await? {
        Some(row) => Ok(enrich_requests(store, auth, vec![row]).await.pop()),
        None => Ok(None),
    }
}

fn referenced_equipment(rows: &[MaintenanceRequest]) -> BTreeSet<i64> {
    rows.iter().filter_map(|r| r.equipment_id).collect()
}

fn referenced_people(rows: &[MaintenanceRequest]) -> BTreeSet<ProfileId> {
    rows.iter()
        .flat_map(|r| [r.created_by.as_ref(), r.technician_id.as_ref()])
        .flatten()
        .cloned()
        .collect()
}

/// Resolves equipment and people names for `rows`. Output has the same
/// length and order as the input.
pub async fn enrich_requests(
    store: &dyn RemoteStore,
    auth: &Bearer,
    rows: Vec<MaintenanceRequest>,
) -> Vec<EnrichedMaintenanceRequest> {
    let equipment_ids = referenced_equipment(&rows);
    let person_ids = referenced_people(&rows);

    let (equipment, people) = tokio::join!(
        equipment_labels(store, auth, &equipment_ids),
        profile_names(store, auth, &person_ids),
    );

    let equipment = equipment.unwrap_or_else(|e| {
        warn!("Equipment lookup failed, names left blank: {}", e);
        HashMap::new()
    });
    let people = people.unwrap_or_else(|e| {
        warn!("Profile lookup failed, names left blank: {}", e);
        HashMap::new()
    });

    rows.into_iter()
        .map(|request| resolve(request, &equipment, &people))
        .collect()
}

fn resolve(
    request: MaintenanceRequest,
    equipment: &HashMap<i64, EquipmentLabel>,
    people: &HashMap<ProfileId, String>,
) -> EnrichedMaintenanceRequest {
    let label = request.equipment_id.and_then(|id| equipment.get(&id));
    let person = |id: &Option<ProfileId>| id.as_ref().and_then(|id| people.get(id)).cloned();

    EnrichedMaintenanceRequest {
        equipment_name: label.map(|l| l.name.clone()),
        equipment_category: label.and_then(|l| l.category.clone()),
        creator_name: person(&request.created_by),
        technician_name: person(&request.technician_id),
        request,
    }
}
