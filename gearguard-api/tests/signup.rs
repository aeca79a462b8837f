use rocket::http::Status;
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::{Value, json};

use gearguard_api::testing::{SARAH_EMAIL, test_rocket};

#[tokio::test]
async fn test_signup_creates_account_and_profile() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client
        .post("/api/1/signup")
        .json(&json!({
            "name": "Jordan Lee",
            "email": "jordan@gearguard.test",
            "role": "technician",
            "password": "secret1",
            "confirm_password": "secret1"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let outcome: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(outcome["email"], "jordan@gearguard.test");
    assert_eq!(outcome["profile_saved"], true);
    assert_eq!(outcome["confirmation_required"], true);

    // The new account can sign in and owns its profile.
    let login = client
        .post("/api/1/login")
        .json(&json!({"email": "jordan@gearguard.test", "password": "secret1"}))
        .dispatch()
        .await;
    assert_eq!(login.status(), Status::Ok);
    let cookie = login.cookies().get("session").expect("Session cookie should be set").clone();

    let profile = client.get("/api/1/profile").cookie(cookie).dispatch().await;
    assert_eq!(profile.status(), Status::Ok);
    let profile: Value = profile.into_json().await.expect("valid JSON");
    assert_eq!(profile["full_name"], "Jordan Lee");
    assert_eq!(profile["role"], "technician");
}

#[tokio::test]
async fn test_signup_validation() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let cases = [
        (json!({"name": "", "email": "a@b.test", "password": "secret1"}), "Name is required"),
        (json!({"name": "Ann", "email": "not-an-email", "password": "secret1"}), "Invalid email"),
        (
            json!({"name": "Ann", "email": "a@b.test", "password": "12345"}),
            "Password must be at least 6 characters",
        ),
        (
            json!({"name": "Ann", "email": "a@b.test", "password": "secret1", "confirm_password": "secret2"}),
            "Passwords don't match",
        ),
    ];

    for (body, message) in cases {
        let response = client.post("/api/1/signup").json(&body).dispatch().await;
        assert_eq!(response.status(), Status::UnprocessableEntity);
        let error: Value = response.into_json().await.expect("valid JSON");
        assert_eq!(error["error"], message);
    }
}

#[tokio::test]
async fn test_signup_with_taken_email() {
    let client = Client::tracked(test_rocket()).await.unwrap();

    let response = client
        .post("/api/1/signup")
        .json(&json!({"name": "Sarah Again", "email": SARAH_EMAIL, "password": "secret1"}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let error: Value = response.into_json().await.expect("valid JSON");
    assert_eq!(error["error"], "Sign up failed: User already registered");
}
