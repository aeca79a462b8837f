//! JSON data guard that logs the request body it parsed.
//!
//! Use `LoggedJson<T>` wherever a route would take `Json<T>` and the body
//! is worth seeing in the log. Fields whose name mentions "password" or
//! "token" are masked before logging.

use rocket::data::{self, FromData};
use rocket::serde::json::Json;
use rocket::{Data, Request};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MASK: &str = "***";

pub struct LoggedJson<T>(pub T);

impl<T> LoggedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for LoggedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::DerefMut for LoggedJson<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

fn is_secret(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("password") || key.contains("token")
}

/// Replaces secret fields, at any depth, with a mask.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if is_secret(key) {
                    *field = Value::String(MASK.to_string());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

#[rocket::async_trait]
impl<'r, T: Deserialize<'r> + Serialize> FromData<'r> for LoggedJson<T> {
    type Error = rocket::serde::json::Error<'r>;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        match Json::<T>::from_data(req, data).await {
            data::Outcome::Success(json) => {
                let body = match serde_json::to_value(&json.0) {
                    Ok(mut value) => {
                        redact(&mut value);
                        value.to_string()
                    }
                    Err(_) => "<unserializable>".to_string(),
                };
                info!("{} {} body: {}", req.method().as_str(), req.uri().path(), body);
                data::Outcome::Success(LoggedJson(json.into_inner()))
            }
            data::Outcome::Error(e) => data::Outcome::Error(e),
            data::Outcome::Forward(f) => data::Outcome::Forward(f),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LoggedJson<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn secrets_are_masked_at_any_depth() {
        let mut body = json!({
            "email": "sarah@gearguard.test",
            "password": "hunter22",
            "nested": [{"refresh_token": "r1", "subject": "Oil leak"}]
        });
        redact(&mut body);
        assert_eq!(body["email"], "sarah@gearguard.test");
        assert_eq!(body["password"], "***");
        assert_eq!(body["nested"][0]["refresh_token"], "***");
        assert_eq!(body["nested"][0]["subject"], "Oil leak");
    }
}
