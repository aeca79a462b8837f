use clap::Subcommand;
use gearguard_api::{
    display::or_dash,
    models::TeamWithMembers,
    store::{Bearer, RemoteStore, team::teams_with_members},
};

#[derive(Subcommand)]
pub enum TeamAction {
    #[command(about = "List teams with their members")]
    Ls,
}

pub async fn handle_team_command(
    store: &dyn RemoteStore,
    bearer: &Bearer,
    action: TeamAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TeamAction::Ls => {
            let teams = teams_with_members(store, bearer).await?;
            if teams.is_empty() {
                println!("No teams found.");
            } else {
                println!("Teams:");
                for team in &teams {
                    for line in team_lines(team) {
                        println!("{}", line);
                    }
                }
            }
        }
    }
    Ok(())
}

pub fn team_lines(team: &TeamWithMembers) -> Vec<String> {
    let mut lines = vec![format!(
        "  ID: {}, Name: {}, Company: {}",
        team.team.id,
        team.team.name,
        or_dash(team.team.company.as_deref())
    )];
    if team.members.is_empty() {
        lines.push("    (no members)".to_string());
    }
    for member in &team.members {
        lines.push(format!("    {}", member.full_name.as_deref().unwrap_or(&member.id)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearguard_api::store::MemoryStore;

    #[tokio::test]
    async fn lines_list_members() {
        let store = MemoryStore::seeded();
        let teams = teams_with_members(&store, &Bearer::anonymous()).await.unwrap();

        let mechanics = teams.iter().find(|t| t.team.name == "Mechanics").unwrap();
        assert_eq!(
            team_lines(mechanics),
            vec![
                "  ID: 1, Name: Mechanics, Company: Gear Guard Manufacturing".to_string(),
                "    Alex Johnson".to_string(),
                "    Sarah Chen".to_string(),
            ]
        );

        let electricians = teams.iter().find(|t| t.team.name == "Electricians").unwrap();
        assert_eq!(team_lines(electricians)[0], "  ID: 3, Name: Electricians, Company: —");
        assert_eq!(team_lines(electricians)[1], "    (no members)");
    }
}
