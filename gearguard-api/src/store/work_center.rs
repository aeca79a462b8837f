use super::{Bearer, Query, RemoteStore, StoreError, WORK_CENTERS, decode_rows};
use crate::models::WorkCenter;

pub async fn list_work_centers(
    store: &dyn RemoteStore,
    auth: &Bearer,
) -> Result<Vec<WorkCenter>, StoreError> {
    let query = Query::from(WORK_CENTERS).order("name", true);
    let rows = store.select(auth, &query).await?;
    decode_rows(WORK_CENTERS, rows)
}
