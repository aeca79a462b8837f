use std::str::FromStr;

use super::{Bearer, Filter, MAINTENANCE_REQUESTS, Query, RemoteStore, StoreError};
use super::{decode_row, decode_rows, encode_row};
use crate::models::{MaintenanceRequest, MaintenanceRequestPatch, NewMaintenanceRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSortKey {
    CreatedAt,
    ScheduledDate,
    Priority,
    Subject,
}

impl RequestSortKey {
    fn column(&self) -> &'static str {
        match self {
            RequestSortKey::CreatedAt => "created_at",
            RequestSortKey::ScheduledDate => "scheduled_date",
            RequestSortKey::Priority => "priority",
            RequestSortKey::Subject => "subject",
        }
    }
}

/// Ordering of the base request fetch. Newest first unless asked otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOrder {
    pub key: RequestSortKey,
    pub ascending: bool,
}

impl Default for RequestOrder {
    fn default() -> Self {
        RequestOrder {
            key: RequestSortKey::CreatedAt,
            ascending: false,
        }
    }
}

impl FromStr for RequestOrder {
    type Err = String;

    /// Parses `column` or `column.asc|desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = s.split_once('.').unwrap_or((s, "desc"));
        let key = match column {
            "created_at" => RequestSortKey::CreatedAt,
            "scheduled_date" => RequestSortKey::ScheduledDate,
            "priority" => RequestSortKey::Priority,
            "subject" => RequestSortKey::Subject,
            other => return Err(format!("cannot sort requests by '{}'", other)),
        };
        let ascending = match direction {
            "asc" => true,
            "desc" => false,
            other => return Err(format!("unknown sort direction '{}'", other)),
        };
        Ok(RequestOrder { key, ascending })
    }
}

pub async fn list_requests(
    store: &dyn RemoteStore,
    auth: &Bearer,
    order: RequestOrder,
) -> Result<Vec<MaintenanceRequest>, StoreError> {
    let query = Query::from(MAINTENANCE_REQUESTS).order(order.key.column(), order.ascending);
    let rows = store.select(auth, &query).await?;
    decode_rows(MAINTENANCE_REQUESTS, rows)
}

pub async fn get_request(
    store: &dyn RemoteStore,
    auth: &Bearer,
    id: i64,
) -> Result<Option<MaintenanceRequest>, StoreError> {
    let query = Query::from(MAINTENANCE_REQUESTS).eq("id", id).limit(1);
    let rows = store.select(auth, &query).await?;
    rows.into_iter()
        .next()
        .map(|row| decode_row(MAINTENANCE_REQUESTS, row))
        .transpose()
}

pub async fn insert_request(
    store: &dyn RemoteStore,
    auth: &Bearer,
    new_request: &NewMaintenanceRequest,
) -> Result<MaintenanceRequest, StoreError> {
    let row = encode_row(MAINTENANCE_REQUESTS, new_request)?;
    let stored = store.insert(auth, MAINTENANCE_REQUESTS, row).await?;
    decode_row(MAINTENANCE_REQUESTS, stored)
}

/// Applies a partial update. `Ok(None)` when no row has that id.
pub async fn update_request(
    store: &dyn RemoteStore,
    auth: &Bearer,
    id: i64,
    patch: &MaintenanceRequestPatch,
) -> Result<Option<MaintenanceRequest>, StoreError> {
    if patch.is_empty() {
        return get_request(store, auth, id).await;
    }
    let patch = encode_row(MAINTENANCE_REQUESTS, patch)?;
    let rows = store
        .update(auth, MAINTENANCE_REQUESTS, &[Filter::eq("id", id)], patch)
        .await?;
    rows.into_iter()
        .next()
        .map(|row| decode_row(MAINTENANCE_REQUESTS, row))
        .transpose()
}

/// Deletes one request; `Ok(false)` when it did not exist.
pub async fn delete_request(store: &dyn RemoteStore, auth: &Bearer, id: i64) -> Result<bool, StoreError> {
    let removed = store
        .delete(auth, MAINTENANCE_REQUESTS, &[Filter::eq("id", id)])
        .await?;
    Ok(removed > 0)
}
