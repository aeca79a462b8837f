use std::collections::{BTreeSet, HashMap};

use super::{Bearer, EQUIPMENT, Query, RemoteStore, StoreError, decode_row, decode_rows};
use crate::models::{Equipment, EquipmentLabel};

pub async fn list_equipment(store: &dyn RemoteStore, auth: &Bearer) -> Result<Vec<Equipment>, StoreError> {
    let query = Query::from(EQUIPMENT).order("name", true);
    let rows = store.select(auth, &query).await?;
    decode_rows(EQUIPMENT, rows)
}

pub async fn get_equipment(
    store: &dyn RemoteStore,
    auth: &Bearer,
    id: i64,
) -> Result<Option<Equipment>, StoreError> {
    let query = Query::from(EQUIPMENT).eq("id", id).limit(1);
    let rows = store.select(auth, &query).await?;
    rows.into_iter()
        .next()
        .map(|row| decode_row(EQUIPMENT, row))
        .transpose()
}

/// Names and categories for a set of equipment ids, in one round trip.
/// An empty id set never reaches the store.
pub async fn equipment_labels(
    store: &dyn RemoteStore,
    auth: &Bearer,
    ids: &BTreeSet<i64>,
) -> Result<HashMap<i64, EquipmentLabel>, StoreError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let query = Query::from(EQUIPMENT)
        .select(&["id", "name", "category"])
        .is_in("id", ids.iter().copied());
    let rows = store.select(auth, &query).await?;
    let labels: Vec<EquipmentLabel> = decode_rows(EQUIPMENT, rows)?;
    Ok(labels.into_iter().map(|label| (label.id, label)).collect())
}
