//! Service configuration.
//!
//! Settings are layered with Rocket's figment: built-in defaults, then
//! `Rocket.toml` (nested profiles), then `ROCKET_*` variables, then
//! `GEARGUARD_STORE_*` variables which land under the `store` key.

use rocket::figment::Figment;
use rocket::figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Which remote store implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The hosted PostgREST/auth service at `store.url`.
    #[default]
    Rest,
    /// In-process tables seeded with demo data.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: StoreBackend::default(),
            url: None,
            anon_key: None,
            timeout_secs: 10,
        }
    }
}

impl StoreConfig {
    pub fn memory() -> Self {
        StoreConfig {
            backend: StoreBackend::Memory,
            ..Default::default()
        }
    }

    /// Reads `GEARGUARD_STORE_*` variables alone, for tools that run
    /// without a Rocket instance.
    pub fn from_env() -> Result<Self, rocket::figment::Error> {
        Figment::from(Serialized::defaults(StoreConfig::default()))
            .merge(Env::prefixed("GEARGUARD_STORE_"))
            .extract()
    }
}

/// The figment the service launches with.
pub fn figment() -> Figment {
    Figment::from(rocket::Config::default())
        .merge(Serialized::default("store", StoreConfig::default()))
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global())
        .merge(
            Env::prefixed("GEARGUARD_STORE_")
                .map(|key| format!("store.{}", key.as_str().to_ascii_lowercase()).into()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_section_is_layered() {
        let figment = Figment::from(Serialized::default("store", StoreConfig::default())).merge(
            Toml::string(
                r#"
                [store]
                backend = "memory"
                url = "https://example.supabase.co"
                timeout_secs = 3
                "#,
            ),
        );
        let store: StoreConfig = figment.extract_inner("store").unwrap();
        assert_eq!(store.backend, StoreBackend::Memory);
        assert_eq!(store.url.as_deref(), Some("https://example.supabase.co"));
        assert_eq!(store.anon_key, None);
        assert_eq!(store.timeout_secs, 3);
    }

    #[test]
    fn defaults_target_the_rest_backend() {
        let store = StoreConfig::default();
        assert_eq!(store.backend, StoreBackend::Rest);
        assert_eq!(store.timeout_secs, 10);
        assert_eq!(StoreConfig::memory().backend, StoreBackend::Memory);
    }
}
