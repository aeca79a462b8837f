use std::path::Path;

use clap::Subcommand;
use gearguard_api::{
    backend::Backend,
    store::{Bearer, profile::profile_full_name},
};
use rpassword::prompt_password;

use super::utils::{StoredSession, load_session, prompt_line, remove_session, save_session};

#[derive(Subcommand)]
pub enum SessionAction {
    #[command(about = "Sign in and remember the session")]
    Login {
        #[arg(short, long, help = "Email address (prompted if not provided)")]
        email: Option<String>,
        #[arg(short, long, help = "Password (will be prompted securely if not provided)")]
        password: Option<String>,
    },
    #[command(about = "Sign out and forget the session")]
    Logout,
    #[command(about = "Show who is signed in")]
    Whoami,
}

pub async fn handle_session_command(
    backend: &Backend,
    session_file: &Path,
    action: SessionAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Login { email, password } => {
            let email = match email {
                Some(e) => e,
                None => prompt_line("Email")?,
            };
            let password = match password {
                Some(p) => p,
                None => prompt_password("Password: ")?,
            };
            let session = login_impl(backend, session_file, &email, &password).await?;
            println!("Signed in as {} <{}>", session.name(), session.email);
        }
        SessionAction::Logout => {
            if logout_impl(backend, session_file).await? {
                println!("Signed out.");
            } else {
                println!("Not signed in.");
            }
        }
        SessionAction::Whoami => match load_session(session_file)? {
            Some(session) => {
                println!("{} <{}>", session.name(), session.email);
                println!("User ID: {}", session.user_id);
                if let Some(expires_at) = session.expires_at {
                    println!("Token expires: {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
                }
            }
            None => println!("Not signed in."),
        },
    }
    Ok(())
}

/// Signs in, caches the profile name and writes the session file.
pub async fn login_impl(
    backend: &Backend,
    session_file: &Path,
    email: &str,
    password: &str,
) -> Result<StoredSession, Box<dyn std::error::Error>> {
    let tokens = backend.auth.sign_in_with_password(email.trim(), password).await?;

    let bearer = Bearer::token(tokens.access_token.clone());
    let display_name = match profile_full_name(backend.store.as_ref(), &bearer, &tokens.user.id).await {
        Ok(name) => name,
        Err(e) => {
            eprintln!("Warning: could not load profile name: {}", e);
            None
        }
    };

    let session = StoredSession::from_auth(tokens, display_name);
    save_session(session_file, &session)?;
    Ok(session)
}

/// Revokes the stored tokens and removes the session file. A failed remote
/// sign-out still removes the local session.
pub async fn logout_impl(backend: &Backend, session_file: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    let Some(session) = load_session(session_file)? else {
        return Ok(false);
    };
    if let Err(e) = backend.auth.sign_out(&session.access_token).await {
        eprintln!("Warning: remote sign-out failed: {}", e);
    }
    remove_session(session_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearguard_api::store::{MemoryStore, PROFILES};
    use gearguard_api::testing::{DEMO_PASSWORD, SARAH_EMAIL};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn login_writes_session_file() {
        let backend = Backend::from_shared(Arc::new(MemoryStore::seeded()));
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let session = login_impl(&backend, &path, SARAH_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert_eq!(session.name(), "Sarah Chen");
        assert_eq!(load_session(&path).unwrap(), Some(session));
    }

    #[tokio::test]
    async fn bad_password_leaves_no_file() {
        let backend = Backend::from_shared(Arc::new(MemoryStore::seeded()));
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        assert!(login_impl(&backend, &path, SARAH_EMAIL, "wrong").await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn profile_outage_does_not_block_login() {
        let store = Arc::new(MemoryStore::seeded());
        store.fail_table(PROFILES);
        let backend = Backend::from_shared(store);
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let session = login_impl(&backend, &path, SARAH_EMAIL, DEMO_PASSWORD).await.unwrap();
        // The auth service still knows the name.
        assert_eq!(session.name(), "Sarah Chen");
    }

    #[tokio::test]
    async fn logout_revokes_tokens() {
        let backend = Backend::from_shared(Arc::new(MemoryStore::seeded()));
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let session = login_impl(&backend, &path, SARAH_EMAIL, DEMO_PASSWORD).await.unwrap();

        assert!(logout_impl(&backend, &path).await.unwrap());
        assert!(!path.exists());
        assert!(backend.auth.get_user(&session.access_token).await.is_err());
        assert!(!logout_impl(&backend, &path).await.unwrap());
    }
}
