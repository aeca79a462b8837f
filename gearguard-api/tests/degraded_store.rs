use std::sync::Arc;

use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::{Value, json};

use gearguard_api::store::{EQUIPMENT, MAINTENANCE_REQUESTS, MemoryStore, PROFILES};
use gearguard_api::testing::{ALEX_EMAIL, DEMO_PASSWORD, test_rocket_with};

async fn login_alex(client: &Client) -> Cookie<'static> {
    let response = client
        .post("/api/1/login")
        .json(&json!({"email": ALEX_EMAIL, "password": DEMO_PASSWORD}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    response.cookies().get("session").expect("Session cookie should be set").clone().into_owned()
}

#[tokio::test]
async fn test_failed_base_query_is_bad_gateway() {
    let store = Arc::new(MemoryStore::seeded());
    let client = Client::tracked(test_rocket_with(store.clone())).await.unwrap();
    let cookie = login_alex(&client).await;

    store.fail_table(MAINTENANCE_REQUESTS);
    let response = client.get("/api/1/MaintenanceRequests").cookie(cookie.clone()).dispatch().await;
    assert_eq!(response.status(), Status::BadGateway);
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["error"], "Failed to load maintenance requests");

    store.heal_table(MAINTENANCE_REQUESTS);
    let response = client.get("/api/1/MaintenanceRequests").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn test_failed_lookups_leave_names_empty() {
    let store = Arc::new(MemoryStore::seeded());
    let client = Client::tracked(test_rocket_with(store.clone())).await.unwrap();
    let cookie = login_alex(&client).await;

    store.fail_table(PROFILES);
    store.fail_table(EQUIPMENT);
    let response = client.get("/api/1/MaintenanceRequests/1").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["subject"], "Spindle vibration");
    assert!(body["equipment_name"].is_null());
    assert!(body["technician_name"].is_null());
    assert!(body["creator_name"].is_null());
}

#[tokio::test]
async fn test_list_enrichment_is_batched() {
    let store = Arc::new(MemoryStore::seeded());
    let client = Client::tracked(test_rocket_with(store.clone())).await.unwrap();
    let cookie = login_alex(&client).await;

    store.clear_queries();
    let response = client.get("/api/1/MaintenanceRequests").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let tables: Vec<String> = store.queries().into_iter().map(|q| q.table).collect();
    assert_eq!(tables.len(), 3);
    assert_eq!(tables[0], MAINTENANCE_REQUESTS);
    assert!(tables.contains(&EQUIPMENT.to_string()));
    assert!(tables.contains(&PROFILES.to_string()));
}

#[tokio::test]
async fn test_login_survives_profile_outage() {
    let store = Arc::new(MemoryStore::seeded());
    store.fail_table(PROFILES);
    let client = Client::tracked(test_rocket_with(store)).await.unwrap();

    let response = client
        .post("/api/1/login")
        .json(&json!({"email": ALEX_EMAIL, "password": DEMO_PASSWORD}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON");
    // Falls back to the name the auth service knows.
    assert_eq!(body["name"], "Alex Johnson");
}
