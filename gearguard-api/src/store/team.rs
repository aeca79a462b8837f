use std::collections::{BTreeSet, HashMap};

use super::profile::profiles_in_teams;
use super::{Bearer, Query, RemoteStore, StoreError, TEAMS, decode_rows};
use crate::models::{ProfileSummary, Team, TeamWithMembers};

pub async fn list_teams(store: &dyn RemoteStore, auth: &Bearer) -> Result<Vec<Team>, StoreError> {
    let query = Query::from(TEAMS).order("name", true);
    let rows = store.select(auth, &query).await?;
    decode_rows(TEAMS, rows)
}

/// Teams with their members, resolved with a single profile query. A failed
/// member lookup leaves the member lists empty.
pub async fn teams_with_members(
    store: &dyn RemoteStore,
    auth: &Bearer,
) -> Result<Vec<TeamWithMembers>, StoreError> {
    let teams = list_teams(store, auth).await?;

    let team_ids: BTreeSet<i64> = teams.iter().map(|t| t.id).collect();
    let members = profiles_in_teams(store, auth, &team_ids).await.unwrap_or_else(|e| {
        warn!("Team member lookup failed, member lists left empty: {}", e);
        Vec::new()
    });

    let mut by_team: HashMap<i64, Vec<ProfileSummary>> = HashMap::new();
    for profile in members {
        if let Some(team_id) = profile.team_id {
            by_team.entry(team_id).or_default().push(ProfileSummary {
                id: profile.id,
                full_name: profile.full_name,
            });
        }
    }

    Ok(teams
        .into_iter()
        .map(|team| TeamWithMembers {
            members: by_team.remove(&team.id).unwrap_or_default(),
            team,
        })
        .collect())
}
