use std::sync::Arc;

use rocket::fairing::AdHoc;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::config::{StoreBackend, StoreConfig};
use crate::store::{AuthProvider, MemoryStore, PostgrestStore, RemoteStore, StoreError};

/// The remote data store and its auth service, shared by every request.
#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn RemoteStore>,
    pub auth: Arc<dyn AuthProvider>,
}

impl Backend {
    /// Both halves served by one object, which is how both implementations
    /// are shaped.
    pub fn from_shared<T>(backend: Arc<T>) -> Self
    where
        T: RemoteStore + AuthProvider + 'static,
    {
        Backend {
            store: backend.clone(),
            auth: backend,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        match config.backend {
            StoreBackend::Rest => Ok(Self::from_shared(Arc::new(PostgrestStore::new(config)?))),
            StoreBackend::Memory => Ok(Self::from_shared(Arc::new(MemoryStore::seeded()))),
        }
    }
}

/// Reads the `store` section and manages the matching [`Backend`].
/// Ignition fails when the hosted backend is selected but not configured.
pub fn backend_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Remote Store", |rocket| async {
        if rocket.state::<Backend>().is_some() {
            return Ok(rocket);
        }

        let config: StoreConfig = match rocket.figment().extract_inner("store") {
            Ok(config) => config,
            Err(e) => {
                warn!("[store] no usable store configuration ({}), using defaults", e);
                StoreConfig::default()
            }
        };

        match Backend::from_config(&config) {
            Ok(backend) => {
                match config.backend {
                    StoreBackend::Rest => info!(
                        "[store] using remote store at {}",
                        config.url.as_deref().unwrap_or_default()
                    ),
                    StoreBackend::Memory => info!("[store] using in-memory demo store"),
                }
                Ok(rocket.manage(backend))
            }
            Err(e) => {
                error!("[store] ERROR: {}", e);
                Err(rocket)
            }
        }
    })
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r Backend {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match request.rocket().state::<Backend>() {
            Some(backend) => Outcome::Success(backend),
            None => {
                error!("Remote store is not attached");
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}
