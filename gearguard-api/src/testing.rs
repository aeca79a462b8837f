//! Rocket instances for tests.
//!
//! Both builders serve the seeded demo data from an in-process
//! [`MemoryStore`] and never touch the network or `Rocket.toml`.

use std::sync::Arc;

use rocket::figment::providers::Serialized;
use rocket::{Build, Rocket};

use crate::backend::Backend;
use crate::config::StoreConfig;
use crate::store::MemoryStore;

pub use crate::store::memory::DEMO_PASSWORD;

/// Manager account seeded in the demo data.
pub const ALEX_EMAIL: &str = "alex@gearguard.test";
/// Technician assigned to most demo requests.
pub const SARAH_EMAIL: &str = "sarah@gearguard.test";
pub const MIKE_EMAIL: &str = "mike@gearguard.test";

/// A Rocket instance over a fresh seeded store.
pub fn test_rocket() -> Rocket<Build> {
    test_rocket_with(Arc::new(MemoryStore::seeded()))
}

/// A Rocket instance over the given store. Keep a clone of the `Arc` to
/// inspect recorded queries or fail tables from the test.
pub fn test_rocket_with(store: Arc<MemoryStore>) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(Serialized::default("store", StoreConfig::memory()))
        .merge(("log_level", "off"));

    crate::build_rocket(figment).manage(Backend::from_shared(store))
}
