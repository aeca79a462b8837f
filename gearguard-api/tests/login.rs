use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::{Value, json};

use gearguard_api::testing::{DEMO_PASSWORD, SARAH_EMAIL, test_rocket};

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client
        .post("/api/1/login")
        .header(ContentType::JSON)
        .body(json!({"email": SARAH_EMAIL, "password": DEMO_PASSWORD}).to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let cookie = response.cookies().get("session").expect("Session cookie should be set");
    assert!(!cookie.value().is_empty());

    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["email"], SARAH_EMAIL);
    assert_eq!(body["name"], "Sarah Chen");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client
        .post("/api/1/login")
        .json(&json!({"email": SARAH_EMAIL, "password": "not-the-password"}))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Unauthorized);
    assert!(response.cookies().get("session").is_none());
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_unknown_account_is_rejected() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client
        .post("/api/1/login")
        .json(&json!({"email": "nobody@gearguard.test", "password": DEMO_PASSWORD}))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_hello_requires_session() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client.get("/api/1/hello").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["status"], 401);
    assert_eq!(body["path"], "/api/1/hello");
}

#[tokio::test]
async fn test_hello_answers_with_session_user() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let login = client
        .post("/api/1/login")
        .json(&json!({"email": SARAH_EMAIL, "password": DEMO_PASSWORD}))
        .dispatch()
        .await;
    let cookie = login.cookies().get("session").expect("Session cookie should be set").clone();

    let response = client.get("/api/1/hello").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["name"], "Sarah Chen");
}

#[tokio::test]
async fn test_forged_session_cookie_is_rejected() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client
        .get("/api/1/hello")
        .cookie(rocket::http::Cookie::new("session", "not-a-session"))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_status_is_public() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client.get("/api/1/status").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(body["status"], "running");
    assert_eq!(body["open_sessions"], 0);
}
