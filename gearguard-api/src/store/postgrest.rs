//! HTTP client for the hosted backend (PostgREST data API plus its auth
//! service).

use std::time::Duration;

use chrono::{TimeZone, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::auth::{AuthError, AuthProvider, AuthSession, AuthUser, SignUpMetadata};
use super::{Bearer, Filter, Query, RemoteStore, StoreError};
use crate::config::StoreConfig;

pub struct PostgrestStore {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl PostgrestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let base_url = config
            .url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| StoreError::Config("store.url is not set".to_string()))?;
        let anon_key = config
            .anon_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| StoreError::Config("store.anon_key is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(PostgrestStore { client, base_url, anon_key })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder, auth: &Bearer) -> RequestBuilder {
        let token = auth.as_token().unwrap_or(&self.anon_key);
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    async fn rows(&self, response: Response) -> Result<Vec<Value>, StoreError> {
        let response = check(response).await?;
        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    async fn first_row(&self, table: &str, response: Response) -> Result<Value, StoreError> {
        self.rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::MissingRow { table: table.to_string() })
    }
}

async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected { status: status.as_u16(), message })
}

/// Renders a JSON value as a PostgREST filter operand.
fn operand(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(column, Value::Null) => (column.clone(), "is.null".to_string()),
        Filter::Eq(column, value) => (column.clone(), format!("eq.{}", operand(value))),
        Filter::In(column, values) => {
            let list = values
                .iter()
                .map(|v| match v {
                    Value::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
                    other => operand(other),
                })
                .collect::<Vec<_>>()
                .join(",");
            (column.clone(), format!("in.({})", list))
        }
    }
}

/// Query-string pairs for a select.
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), query.column_list())];
    params.extend(query.filters.iter().map(filter_param));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

#[rocket::async_trait]
impl RemoteStore for PostgrestStore {
    async fn select(&self, auth: &Bearer, query: &Query) -> Result<Vec<Value>, StoreError> {
        let request = self
            .authorize(self.client.get(self.table_url(&query.table)), auth)
            .query(&query_params(query));
        let response = request.send().await?;
        self.rows(response).await
    }

    async fn insert(&self, auth: &Bearer, table: &str, row: Value) -> Result<Value, StoreError> {
        let request = self
            .authorize(self.client.post(self.table_url(table)), auth)
            .header("Prefer", "return=representation")
            .json(&row);
        let response = request.send().await?;
        self.first_row(table, response).await
    }

    async fn upsert(
        &self,
        auth: &Bearer,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> Result<Value, StoreError> {
        let request = self
            .authorize(self.client.post(self.table_url(table)), auth)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row);
        let response = request.send().await?;
        self.first_row(table, response).await
    }

    async fn update(
        &self,
        auth: &Bearer,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let params: Vec<(String, String)> = filters.iter().map(filter_param).collect();
        let request = self
            .authorize(self.client.patch(self.table_url(table)), auth)
            .query(&params)
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = request.send().await?;
        self.rows(response).await
    }

    async fn delete(&self, auth: &Bearer, table: &str, filters: &[Filter]) -> Result<usize, StoreError> {
        let params: Vec<(String, String)> = filters.iter().map(filter_param).collect();
        let request = self
            .authorize(self.client.delete(self.table_url(table)), auth)
            .query(&params)
            .header("Prefer", "return=representation");
        let response = request.send().await?;
        Ok(self.rows(response).await?.len())
    }
}

#[derive(Deserialize)]
struct WireUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<Value>,
}

impl From<WireUser> for AuthUser {
    fn from(user: WireUser) -> Self {
        let full_name = user
            .user_metadata
            .as_ref()
            .and_then(|m| m.get("full_name"))
            .and_then(Value::as_str)
            .map(str::to_string);
        AuthUser {
            id: user.id,
            email: user.email.unwrap_or_default(),
            full_name,
        }
    }
}

#[derive(Deserialize)]
struct WireSession {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: WireUser,
}

impl From<WireSession> for AuthSession {
    fn from(session: WireSession) -> Self {
        let expires_at = session
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or_else(|| {
                session
                    .expires_in
                    .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
            });
        AuthSession {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_at,
            user: session.user.into(),
        }
    }
}

async fn auth_failure(response: Response) -> AuthError {
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    match status {
        StatusCode::BAD_REQUEST if message.contains("invalid_grant") || message.contains("Invalid login") => {
            AuthError::InvalidCredentials
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AuthError::SessionExpired,
        _ => AuthError::Rejected(message),
    }
}

#[rocket::async_trait]
impl AuthProvider for PostgrestStore {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(match auth_failure(response).await {
                AuthError::SessionExpired => AuthError::InvalidCredentials,
                other => other,
            });
        }
        Ok(response.json::<WireSession>().await?.into())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<(AuthUser, Option<AuthSession>), AuthError> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": metadata.full_name, "role": metadata.role },
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(auth_failure(response).await);
        }

        // Projects with email confirmation answer with the bare user.
        let body: Value = response.json().await?;
        if body.get("access_token").is_some() {
            let session: WireSession = serde_json::from_value(body)
                .map_err(|e| AuthError::Rejected(format!("unexpected sign-up response: {}", e)))?;
            let session = AuthSession::from(session);
            Ok((session.user.clone(), Some(session)))
        } else {
            let user: WireUser = serde_json::from_value(body)
                .map_err(|e| AuthError::Rejected(format!("unexpected sign-up response: {}", e)))?;
            Ok((user.into(), None))
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(auth_failure(response).await)
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(auth_failure(response).await);
        }
        Ok(response.json::<WireUser>().await?.into())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(match auth_failure(response).await {
                AuthError::InvalidCredentials => AuthError::SessionExpired,
                other => other,
            });
        }
        Ok(response.json::<WireSession>().await?.into())
    }
}
