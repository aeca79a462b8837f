#[macro_use]
extern crate rocket;

use rocket::figment::Figment;
use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::{Json, Value, json};
use rocket::{Build, Rocket};

pub mod api;
pub mod auth;
pub mod backend;
pub mod calendar;
pub mod config;
pub mod display;
pub mod enrichment;
pub mod logged_json;
pub mod models;
pub mod reporting;
pub mod session;
pub mod session_guards;
pub mod store;
pub mod testing;

#[cfg(test)]
pub mod generate_types;

use backend::backend_fairing;
use config::StoreConfig;
use session::SessionRegistry;

/// Body of every catcher answer, shaped like the route error bodies plus
/// the path and numeric status.
fn caught(status: Status, req: &Request) -> Json<Value> {
    Json(json!({
        "error": status.reason().unwrap_or("Unknown Error"),
        "path": req.uri().path().to_string(),
        "status": status.code
    }))
}

#[catch(401)]
fn unauthorized(req: &Request) -> Json<Value> {
    caught(Status::Unauthorized, req)
}

#[catch(403)]
fn forbidden(req: &Request) -> Json<Value> {
    caught(Status::Forbidden, req)
}

#[catch(404)]
fn not_found(req: &Request) -> Json<Value> {
    caught(Status::NotFound, req)
}

#[catch(422)]
fn unprocessable_entity(req: &Request) -> Json<Value> {
    caught(Status::UnprocessableEntity, req)
}

#[catch(500)]
fn internal_server_error(req: &Request) -> Json<Value> {
    caught(Status::InternalServerError, req)
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request) -> Json<Value> {
    caught(status, req)
}

pub fn mount_api_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api", api::routes())
}

fn log_rocket_info(rocket: &Rocket<Build>) {
    let figment = rocket.figment();

    if let Ok(address) = figment.extract_inner::<String>("address") {
        info!("Rocket is running at: {}", address);
    }

    if let Ok(port) = figment.extract_inner::<u16>("port") {
        info!("Rocket is listening on port: {}", port);
    }

    match figment.extract_inner::<StoreConfig>("store") {
        Ok(store) => info!(
            "Store backend: {:?} ({})",
            store.backend,
            store.url.as_deref().unwrap_or("no url")
        ),
        Err(e) => warn!("Failed to extract store configuration: {}", e),
    }
}

/// Everything but the launch: session registry, store fairing, catchers
/// and the `/api` routes. A [`backend::Backend`] managed before ignition
/// takes precedence over the configured one.
pub fn build_rocket(figment: Figment) -> Rocket<Build> {
    let rocket = rocket::custom(figment)
        .manage(SessionRegistry::new())
        .attach(backend_fairing())
        .register(
            "/",
            catchers![
                unauthorized,
                forbidden,
                not_found,
                unprocessable_entity,
                internal_server_error,
                default_catcher
            ],
        );

    log_rocket_info(&rocket);
    mount_api_routes(rocket)
}

/// The service as configured by `Rocket.toml` and the environment. Tests
/// use [`testing::test_rocket`] instead.
#[launch]
pub fn rocket() -> Rocket<Build> {
    build_rocket(config::figment())
}
