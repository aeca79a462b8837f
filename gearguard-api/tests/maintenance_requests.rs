use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::{Value, json};

use gearguard_api::testing::{ALEX_EMAIL, DEMO_PASSWORD, test_rocket};

async fn login_alex(client: &Client) -> Cookie<'static> {
    let response = client
        .post("/api/1/login")
        .json(&json!({"email": ALEX_EMAIL, "password": DEMO_PASSWORD}))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    response
        .cookies()
        .get("session")
        .expect("Session cookie should be set")
        .clone()
        .into_owned()
}

#[tokio::test]
async fn test_requests_require_authentication() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");

    let response = client.get("/api/1/MaintenanceRequests").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client.get("/api/1/MaintenanceRequests/1").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client
        .post("/api/1/MaintenanceRequests")
        .json(&json!({"subject": "Anonymous"}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client.delete("/api/1/MaintenanceRequests/1").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_list_is_enriched_and_newest_first() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    let cookie = login_alex(&client).await;

    let response = client.get("/api/1/MaintenanceRequests").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["count"], 5);
    let ids: Vec<i64> = body["value"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![5, 4, 3, 2, 1]);

    let first_request = &body["value"][4];
    assert_eq!(first_request["subject"], "Spindle vibration");
    assert_eq!(first_request["equipment_name"], "Drill Press");
    assert_eq!(first_request["equipment_category"], "Machinery");
    assert_eq!(first_request["technician_name"], "Sarah Chen");
    assert_eq!(first_request["creator_name"], "Alex Johnson");

    // Draft without a technician.
    let draft = &body["value"][1];
    assert_eq!(draft["id"], 4);
    assert!(draft["technician_name"].is_null());
    assert!(draft["stage"].is_null());
}

#[tokio::test]
async fn test_list_order_parameter() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    let cookie = login_alex(&client).await;

    let response = client
        .get("/api/1/MaintenanceRequests?order=subject.asc")
        .cookie(cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["value"][0]["subject"], "Filter change");

    let response = client
        .get("/api/1/MaintenanceRequests?order=colour")
        .cookie(cookie)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_get_single_request() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    let cookie = login_alex(&client).await;

    let response = client
        .get("/api/1/MaintenanceRequests/2")
        .cookie(cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["subject"], "Hydraulic leak");
    assert_eq!(body["equipment_name"], "Forklift");
    assert_eq!(body["technician_name"], "Mike Ross");

    let response = client
        .get("/api/1/MaintenanceRequests/404")
        .cookie(cookie)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}

#[tokio::test]
async fn test_request_lifecycle() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    let cookie = login_alex(&client).await;

    let response = client
        .post("/api/1/MaintenanceRequests")
        .cookie(cookie.clone())
        .json(&json!({
            "subject": "Coolant pump noise",
            "equipment_id": 12,
            "priority": "high",
            "request_type": "corrective",
            "scheduled_date": "2025-03-28T10:00:00Z"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let location = response.headers().get_one("Location").map(str::to_string);
    let created: Value = response.into_json().await.expect("valid JSON");
    let id = created["id"].as_i64().unwrap();
    assert_eq!(location, Some(format!("/api/1/MaintenanceRequests/{}", id)));
    assert_eq!(created["stage"], "new");
    assert_eq!(created["equipment_name"], "CNC Lathe");
    assert_eq!(created["creator_name"], "Alex Johnson");

    let response = client
        .put(format!("/api/1/MaintenanceRequests/{}", id))
        .cookie(cookie.clone())
        .json(&json!({
            "stage": "in_progress",
            "technician_id": "9c3e2f1a-7b6d-4e5c-a4b3-2d1f0e9c8b03"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(updated["stage"], "in_progress");
    assert_eq!(updated["technician_name"], "Mike Ross");
    assert_eq!(updated["subject"], "Coolant pump noise");

    let response = client
        .delete(format!("/api/1/MaintenanceRequests/{}", id))
        .cookie(cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NoContent);

    let response = client
        .delete(format!("/api/1/MaintenanceRequests/{}", id))
        .cookie(cookie)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}

#[tokio::test]
async fn test_update_with_null_clears_references() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    let cookie = login_alex(&client).await;

    let response = client
        .put("/api/1/MaintenanceRequests/1")
        .cookie(cookie.clone())
        .json(&json!({"technician_id": null, "equipment_id": null, "scheduled_date": null}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated: Value = response.into_json().await.expect("valid JSON");
    assert!(updated["technician_id"].is_null());
    assert!(updated["technician_name"].is_null());
    assert!(updated["equipment_id"].is_null());
    assert!(updated["equipment_name"].is_null());
    assert!(updated["scheduled_date"].is_null());
    assert_eq!(updated["subject"], "Spindle vibration");
    assert_eq!(updated["work_center_id"], 1);

    let response = client
        .get("/api/1/MaintenanceRequests/1")
        .cookie(cookie)
        .dispatch()
        .await;
    let stored: Value = response.into_json().await.expect("valid JSON");
    assert!(stored["technician_id"].is_null());
    assert_eq!(stored["creator_name"], "Alex Johnson");
}

#[tokio::test]
async fn test_blank_subject_is_unprocessable() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    let cookie = login_alex(&client).await;

    let response = client
        .post("/api/1/MaintenanceRequests")
        .cookie(cookie.clone())
        .json(&json!({"subject": "   "}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["error"], "Subject is required");

    let response = client
        .put("/api/1/MaintenanceRequests/1")
        .cookie(cookie)
        .json(&json!({"subject": ""}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[tokio::test]
async fn test_update_missing_request_is_not_found() {
    let client = Client::tracked(test_rocket()).await.expect("valid rocket instance");
    let cookie = login_alex(&client).await;

    let response = client
        .put("/api/1/MaintenanceRequests/999")
        .cookie(cookie)
        .json(&json!({"stage": "done"}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}
