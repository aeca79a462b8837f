use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dotenvy::dotenv;
use gearguard_api::{
    backend::Backend,
    config::StoreConfig,
    store::{AuthSession, Bearer},
};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const SESSION_FILE_ENV: &str = "GEARGUARD_SESSION_FILE";

/// Connects to the store named by `GEARGUARD_STORE_*` (a `.env` file is
/// honored).
pub fn connect(verbose: bool) -> Result<Backend, Box<dyn std::error::Error>> {
    dotenv().ok();
    let config = StoreConfig::from_env()?;
    if verbose {
        eprintln!(
            "Using {:?} store{}",
            config.backend,
            config.url.as_deref().map(|u| format!(" at {}", u)).unwrap_or_default()
        );
    }
    Ok(Backend::from_config(&config)?)
}

/// What `session login` leaves behind for later invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    pub fn from_auth(auth: AuthSession, display_name: Option<String>) -> Self {
        StoredSession {
            display_name: display_name.or(auth.user.full_name),
            user_id: auth.user.id,
            email: auth.user.email,
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            expires_at: auth.expires_at,
        }
    }

    pub fn bearer(&self) -> Bearer {
        Bearer::token(self.access_token.clone())
    }

    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

pub fn session_file_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(path) = std::env::var(SESSION_FILE_ENV) {
        return Ok(PathBuf::from(path));
    }
    let config_dir = dirs::config_dir().ok_or("Could not determine the user config directory")?;
    Ok(config_dir.join("gearguard").join("session.json"))
}

pub fn load_session(path: &Path) -> Result<Option<StoredSession>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let session = serde_json::from_str(&contents)
        .map_err(|e| format!("Session file {} is unreadable: {}", path.display(), e))?;
    Ok(Some(session))
}

pub fn save_session(path: &Path, session: &StoredSession) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(session)?)?;
    Ok(())
}

/// Removes the session file. Returns whether there was one.
pub fn remove_session(path: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// The stored session, renewed first when its access token has expired.
pub async fn require_session(
    backend: &Backend,
    path: &Path,
) -> Result<StoredSession, Box<dyn std::error::Error>> {
    let session = load_session(path)?
        .ok_or("Not signed in. Run `gearguard-admin session login` first.")?;
    if !session.is_expired(Utc::now()) {
        return Ok(session);
    }

    match backend.auth.refresh_session(&session.refresh_token).await {
        Ok(tokens) => {
            let renewed = StoredSession {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                expires_at: tokens.expires_at,
                ..session
            };
            save_session(path, &renewed)?;
            Ok(renewed)
        }
        Err(e) => {
            remove_session(path)?;
            Err(format!("Session expired ({}). Sign in again.", e).into())
        }
    }
}

/// Search term matching shared by the `ls` commands: regex by default,
/// plain substring with `-F`. No term matches everything.
pub enum Matcher {
    All,
    Fixed(String),
    Pattern(Regex),
}

impl Matcher {
    pub fn new(term: Option<&str>, fixed_string: bool) -> Result<Self, Box<dyn std::error::Error>> {
        match term {
            None => Ok(Matcher::All),
            Some(term) if fixed_string => Ok(Matcher::Fixed(term.to_string())),
            Some(term) => {
                let regex = Regex::new(term)
                    .map_err(|e| format!("Invalid regex pattern '{}': {}", term, e))?;
                Ok(Matcher::Pattern(regex))
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Fixed(term) => text.contains(term.as_str()),
            Matcher::Pattern(regex) => regex.is_match(text),
        }
    }

    /// True when any of the present fields match.
    pub fn any<'a>(&self, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
        matches!(self, Matcher::All) || fields.into_iter().flatten().any(|f| self.is_match(f))
    }
}

pub fn confirm(prompt: &str) -> Result<bool, Box<dyn std::error::Error>> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn prompt_line(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    print!("{}: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearguard_api::store::{AuthProvider, MemoryStore};
    use gearguard_api::testing::{DEMO_PASSWORD, SARAH_EMAIL};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn stored(expires_at: Option<DateTime<Utc>>) -> StoredSession {
        StoredSession {
            user_id: "u1".to_string(),
            email: "sarah@gearguard.test".to_string(),
            display_name: None,
            access_token: "a1".to_string(),
            refresh_token: "r1".to_string(),
            expires_at,
        }
    }

    #[test]
    fn session_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        assert_eq!(load_session(&path).unwrap(), None);
        save_session(&path, &stored(None)).unwrap();
        assert_eq!(load_session(&path).unwrap(), Some(stored(None)));

        assert!(remove_session(&path).unwrap());
        assert!(!remove_session(&path).unwrap());
    }

    #[test]
    fn corrupt_session_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(load_session(&path).is_err());
    }

    #[test]
    fn name_falls_back_to_email() {
        let mut session = stored(None);
        assert_eq!(session.name(), "sarah@gearguard.test");
        session.display_name = Some("Sarah Chen".to_string());
        assert_eq!(session.name(), "Sarah Chen");
    }

    #[test]
    fn matcher_modes() {
        let regex = Matcher::new(Some("^Drill|Lathe$"), false).unwrap();
        assert!(regex.is_match("Drill Press"));
        assert!(regex.is_match("CNC Lathe"));
        assert!(!regex.is_match("Forklift"));

        let fixed = Matcher::new(Some("C.C"), true).unwrap();
        assert!(!fixed.is_match("CNC Lathe"));
        assert!(fixed.is_match("C.C"));

        assert!(Matcher::new(Some("("), false).is_err());
        assert!(Matcher::new(None, false).unwrap().any([None]));
        assert!(regex.any([None, Some("Drill Press")]));
        assert!(!regex.any([None]));
    }

    #[tokio::test]
    async fn expired_session_is_renewed_on_disk() {
        let store = Arc::new(MemoryStore::seeded());
        let tokens = store.sign_in_with_password(SARAH_EMAIL, DEMO_PASSWORD).await.unwrap();
        let backend = Backend::from_shared(store);

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut session = StoredSession::from_auth(tokens, None);
        session.expires_at = Some(Utc::now() - chrono::Duration::minutes(1));
        save_session(&path, &session).unwrap();

        let renewed = require_session(&backend, &path).await.unwrap();
        assert_ne!(renewed.access_token, session.access_token);
        assert!(!renewed.is_expired(Utc::now()));
        assert_eq!(load_session(&path).unwrap(), Some(renewed));
    }

    #[tokio::test]
    async fn unrenewable_session_is_removed() {
        let backend = Backend::from_shared(Arc::new(MemoryStore::seeded()));
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        save_session(&path, &stored(Some(Utc::now() - chrono::Duration::minutes(1)))).unwrap();

        assert!(require_session(&backend, &path).await.is_err());
        assert!(!path.exists());
    }
}
