use std::collections::{BTreeSet, HashMap};

use serde_json::json;

use super::{Bearer, Filter, PROFILES, Query, RemoteStore, StoreError};
use super::{decode_row, decode_rows, encode_row};
use crate::models::{Profile, ProfileId, ProfileInput, ProfileRole, ProfileSummary};

pub async fn get_profile(
    store: &dyn RemoteStore,
    auth: &Bearer,
    id: &str,
) -> Result<Option<Profile>, StoreError> {
    let query = Query::from(PROFILES).eq("id", id).limit(1);
    let rows = store.select(auth, &query).await?;
    rows.into_iter()
        .next()
        .map(|row| decode_row(PROFILES, row))
        .transpose()
}

/// The display name stored on a profile, if both exist.
pub async fn profile_full_name(
    store: &dyn RemoteStore,
    auth: &Bearer,
    id: &str,
) -> Result<Option<String>, StoreError> {
    let query = Query::from(PROFILES).select(&["id", "full_name"]).eq("id", id).limit(1);
    let rows = store.select(auth, &query).await?;
    let summaries: Vec<ProfileSummary> = decode_rows(PROFILES, rows)?;
    Ok(summaries.into_iter().next().and_then(|p| p.full_name))
}

/// Full names for a set of person ids, in one round trip. Profiles without
/// a name are left out of the map.
pub async fn profile_names(
    store: &dyn RemoteStore,
    auth: &Bearer,
    ids: &BTreeSet<ProfileId>,
) -> Result<HashMap<ProfileId, String>, StoreError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let query = Query::from(PROFILES)
        .select(&["id", "full_name"])
        .is_in("id", ids.iter().cloned());
    let rows = store.select(auth, &query).await?;
    let summaries: Vec<ProfileSummary> = decode_rows(PROFILES, rows)?;
    Ok(summaries
        .into_iter()
        .filter_map(|p| p.full_name.map(|name| (p.id, name)))
        .collect())
}

/// Members of the given teams, in one round trip.
pub async fn profiles_in_teams(
    store: &dyn RemoteStore,
    auth: &Bearer,
    team_ids: &BTreeSet<i64>,
) -> Result<Vec<Profile>, StoreError> {
    if team_ids.is_empty() {
        return Ok(Vec::new());
    }
    let query = Query::from(PROFILES)
        .is_in("team_id", team_ids.iter().copied())
        .order("full_name", true);
    let rows = store.select(auth, &query).await?;
    decode_rows(PROFILES, rows)
}

pub async fn profiles_with_role(
    store: &dyn RemoteStore,
    auth: &Bearer,
    role: ProfileRole,
) -> Result<Vec<Profile>, StoreError> {
    let query = Query::from(PROFILES)
        .eq("role", role.to_string())
        .order("full_name", true);
    let rows = store.select(auth, &query).await?;
    decode_rows(PROFILES, rows)
}

/// Creates the profile or overwrites the fields given in `input`.
pub async fn upsert_profile(
    store: &dyn RemoteStore,
    auth: &Bearer,
    input: &ProfileInput,
) -> Result<Profile, StoreError> {
    let row = encode_row(PROFILES, input)?;
    let stored = store.upsert(auth, PROFILES, row, "id").await?;
    decode_row(PROFILES, stored)
}

pub async fn update_full_name(
    store: &dyn RemoteStore,
    auth: &Bearer,
    id: &str,
    full_name: &str,
) -> Result<Option<Profile>, StoreError> {
    let rows = store
        .update(auth, PROFILES, &[Filter::eq("id", id)], json!({ "full_name": full_name }))
        .await?;
    rows.into_iter()
        .next()
        .map(|row| decode_row(PROFILES, row))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[rocket::async_test]
    async fn empty_id_set_skips_the_store() {
        let store = MemoryStore::seeded();
        let names = profile_names(&store, &Bearer::anonymous(), &BTreeSet::new()).await.unwrap();
        assert!(names.is_empty());
        assert!(store.queries().is_empty());
    }

    #[rocket::async_test]
    async fn upsert_creates_then_overwrites() {
        let store = MemoryStore::new();
        let auth = Bearer::anonymous();
        let mut input = ProfileInput {
            id: "u-new".to_string(),
            full_name: "Jordan Lee".to_string(),
            role: Some(ProfileRole::Technician),
            email: Some("jordan@gearguard.test".to_string()),
        };
        upsert_profile(&store, &auth, &input).await.unwrap();
        input.full_name = "Jordan A. Lee".to_string();
        input.email = None;
        let profile = upsert_profile(&store, &auth, &input).await.unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Jordan A. Lee"));
        assert_eq!(profile.email.as_deref(), Some("jordan@gearguard.test"));
        assert_eq!(store.rows(PROFILES).len(), 1);
    }
}
