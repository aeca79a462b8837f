use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::{Value, json};

use gearguard_api::testing::{DEMO_PASSWORD, SARAH_EMAIL, test_rocket};

async fn login(client: &Client) -> Cookie<'static> {
    let response = client
        .post("/api/1/login")
        .json(&json!({"email": SARAH_EMAIL, "password": DEMO_PASSWORD}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    response.cookies().get("session").expect("Session cookie should be set").clone().into_owned()
}

fn names(list: &Value) -> Vec<&str> {
    list["value"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_equipment_is_sorted_by_name() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let cookie = login(&client).await;

    let response = client.get("/api/1/Equipment").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["count"], 5);
    assert_eq!(
        names(&body),
        vec!["Air Compressor", "CNC Lathe", "Dell Latitude 5440", "Drill Press", "Forklift"]
    );
}

#[tokio::test]
async fn test_equipment_search_matches_name_or_category() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let cookie = login(&client).await;

    let response = client
        .get("/api/1/Equipment?search=MACHINERY")
        .cookie(cookie.clone())
        .dispatch()
        .await;
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(names(&body), vec!["CNC Lathe", "Drill Press"]);

    let response = client
        .get("/api/1/Equipment?search=lift")
        .cookie(cookie)
        .dispatch()
        .await;
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(names(&body), vec!["Forklift"]);
}

#[tokio::test]
async fn test_get_equipment() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let cookie = login(&client).await;

    let response = client.get("/api/1/Equipment/7").cookie(cookie.clone()).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["name"], "Drill Press");
    assert_eq!(body["health_percentage"], 82.0);

    let response = client.get("/api/1/Equipment/99").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[tokio::test]
async fn test_category_report() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let cookie = login(&client).await;

    let response = client
        .get("/api/1/Reports/EquipmentCategories")
        .cookie(cookie)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON");

    assert_eq!(body["total"], 5);
    assert_eq!(
        body["counts"],
        json!([
            {"name": "Computers", "value": 1},
            {"name": "Machinery", "value": 2},
            {"name": "Uncategorized", "value": 1},
            {"name": "Vehicles", "value": 1}
        ])
    );

    let machinery = &body["groups"][1];
    assert_eq!(machinery["category"], "Machinery");
    assert_eq!(machinery["average_health"], 53.0);
    assert_eq!(machinery["items"][0]["name"], "CNC Lathe");
}

#[tokio::test]
async fn test_category_report_with_search() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let cookie = login(&client).await;

    let response = client
        .get("/api/1/Reports/EquipmentCategories?search=compressor")
        .cookie(cookie)
        .dispatch()
        .await;
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["total"], 1);
    assert_eq!(body["groups"][0]["category"], "Uncategorized");
    assert_eq!(body["groups"][0]["average_health"], 91.0);
}
