use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::{Value, json};

use gearguard_api::testing::{DEMO_PASSWORD, MIKE_EMAIL, test_rocket};

async fn login(client: &Client) -> Cookie<'static> {
    let response = client
        .post("/api/1/login")
        .json(&json!({"email": MIKE_EMAIL, "password": DEMO_PASSWORD}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    response.cookies().get("session").expect("Session cookie should be set").clone().into_owned()
}

#[tokio::test]
async fn test_teams_with_members() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let cookie = login(&client).await;

    let response = client.get("/api/1/Teams").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let teams: Value = response.into_json().await.expect("valid JSON");
    let teams = teams.as_array().unwrap();

    let team_names: Vec<&str> = teams.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(team_names, vec!["Electricians", "IT Support", "Mechanics"]);

    assert_eq!(teams[0]["members"], json!([]));
    assert!(teams[0]["company"].is_null());

    let mechanics: Vec<&str> = teams[2]["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(mechanics, vec!["Alex Johnson", "Sarah Chen"]);
    assert_eq!(teams[1]["members"][0]["full_name"], "Mike Ross");
}

#[tokio::test]
async fn test_work_centers_search() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    let cookie = login(&client).await;

    let response = client.get("/api/1/WorkCenters").cookie(cookie.clone()).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let all: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(all.as_array().unwrap().len(), 3);

    let response = client
        .get("/api/1/WorkCenters?search=Assembly")
        .cookie(cookie.clone())
        .dispatch()
        .await;
    let found: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(found.as_array().unwrap().len(), 2);

    let response = client
        .get("/api/1/WorkCenters?search=ps-01")
        .cookie(cookie)
        .dispatch()
        .await;
    let found: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(found[0]["name"], "Paint Shop");
    assert_eq!(found[0]["cost_per_hour"], 75.5);
}

#[tokio::test]
async fn test_rosters_require_authentication() {
    let client = Client::tracked(test_rocket()).await.unwrap();
    assert_eq!(client.get("/api/1/Teams").dispatch().await.status(), Status::Unauthorized);
    assert_eq!(client.get("/api/1/WorkCenters").dispatch().await.status(), Status::Unauthorized);
    assert_eq!(client.get("/api/1/Equipment").dispatch().await.status(), Status::Unauthorized);
    assert_eq!(client.get("/api/1/Dashboard").dispatch().await.status(), Status::Unauthorized);
}
