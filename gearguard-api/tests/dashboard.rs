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
    response.cookies().get("session").expect("Session cookie should be set").clone().into_owned()
}

#[tokio::test]
async fn test_dashboard_figures() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let cookie = login_alex(&client).await;

    let response = client.get("/api/1/Dashboard").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON");

    assert_eq!(body["name"], "Alex Johnson");
    let stats = &body["stats"];
    assert_eq!(stats["open_requests"], 3);
    // Both scheduled open requests are in the past.
    assert_eq!(stats["overdue_requests"], 2);
    assert_eq!(stats["critical_equipment"], 1);
    assert_eq!(stats["technicians"], 2);
    assert_eq!(stats["busy_technicians"], 2);
    assert_eq!(stats["technician_load"], 100);
}

#[tokio::test]
async fn test_active_table_uses_placeholders() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let cookie = login_alex(&client).await;

    let response = client.get("/api/1/Dashboard").cookie(cookie).dispatch().await;
    let body: Value = response.into_json().await.expect("valid JSON");

    let active = body["active"].as_array().unwrap();
    let ids: Vec<i64> = active.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![4, 2, 1]);

    let draft = &active[0];
    assert_eq!(draft["technician"], "Unassigned");
    assert_eq!(draft["stage"], "Draft");
    assert_eq!(draft["equipment"], "Dell Latitude 5440");
    assert_eq!(draft["requested_by"], "Emma Wilson");
    assert_eq!(draft["priority"], 1);

    assert_eq!(active[2]["stage"], "New Request");
    assert_eq!(active[2]["priority"], 3);
}
