//! In-process stand-in for the hosted backend.
//!
//! Tables are vectors of JSON rows behind one mutex. Every select is
//! recorded so callers can assert on round trips, and any table can be
//! switched into a failing state to exercise degraded paths.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, Utc};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::auth::{AuthError, AuthProvider, AuthSession, AuthUser, SignUpMetadata};
use super::{
    Bearer, EQUIPMENT, Filter, MAINTENANCE_REQUESTS, PROFILES, Query, RemoteStore, StoreError,
    TEAMS, WORK_CENTERS,
};

/// Password shared by the seeded demo accounts.
pub const DEMO_PASSWORD: &str = "gearguard";

/// Lifetime of access tokens handed out by the memory auth service.
const TOKEN_LIFETIME_MINUTES: i64 = 60;

struct Account {
    user_id: String,
    password: String,
    full_name: Option<String>,
}

struct Grant {
    user_id: String,
    expires_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    queries: Vec<Query>,
    accounts: HashMap<String, Account>,
    access_tokens: HashMap<String, Grant>,
    refresh_tokens: HashMap<String, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn compare_cells(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn project(row: &Value, columns: &[String]) -> Value {
    if columns.is_empty() {
        return row.clone();
    }
    let mut out = Map::new();
    for column in columns {
        out.insert(column.clone(), row.get(column).cloned().unwrap_or(Value::Null));
    }
    Value::Object(out)
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the demo data set and its accounts.
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            for (table, rows) in demo_tables() {
                state.tables.insert(table.to_string(), rows);
            }
            for (email, user_id, full_name) in DEMO_ACCOUNTS {
                state.accounts.insert(
                    email.to_string(),
                    Account {
                        user_id: user_id.to_string(),
                        password: DEMO_PASSWORD.to_string(),
                        full_name: Some(full_name.to_string()),
                    },
                );
            }
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replaces the contents of a table.
    pub fn set_rows(&self, table: &str, rows: Vec<Value>) {
        self.lock().tables.insert(table.to_string(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Makes every operation on `table` fail until [`MemoryStore::heal_table`].
    pub fn fail_table(&self, table: &str) {
        self.lock().failing.insert(table.to_string());
    }

    pub fn heal_table(&self, table: &str) {
        self.lock().failing.remove(table);
    }

    /// Selects issued so far, oldest first.
    pub fn queries(&self) -> Vec<Query> {
        self.lock().queries.clone()
    }

    pub fn clear_queries(&self) {
        self.lock().queries.clear();
    }

    pub fn add_account(&self, email: &str, password: &str, user_id: &str) {
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                user_id: user_id.to_string(),
                password: password.to_string(),
                full_name: None,
            },
        );
    }

    /// Forces an issued access token past its expiry.
    pub fn expire_access_token(&self, access_token: &str) {
        if let Some(grant) = self.lock().access_tokens.get_mut(access_token) {
            grant.expires_at = Utc::now() - Duration::seconds(1);
        }
    }

    fn check_table(state: &State, table: &str) -> Result<(), StoreError> {
        if state.failing.contains(table) {
            Err(StoreError::Unavailable(table.to_string()))
        } else {
            Ok(())
        }
    }

    fn matching<'a>(rows: &'a mut [Value], filters: &'a [Filter]) -> impl Iterator<Item = &'a mut Value> {
        rows.iter_mut().filter(move |row| filters.iter().all(|f| f.matches(row)))
    }

    fn issue_session(state: &mut State, email: &str) -> Result<AuthSession, AuthError> {
        let account = state.accounts.get(email).ok_or(AuthError::InvalidCredentials)?;
        let user = AuthUser {
            id: account.user_id.clone(),
            email: email.to_string(),
            full_name: account.full_name.clone(),
        };
        let access_token = Uuid::new_v4().to_string();
        let refresh_token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::minutes(TOKEN_LIFETIME_MINUTES);
        state.access_tokens.insert(
            access_token.clone(),
            Grant { user_id: user.id.clone(), expires_at },
        );
        state.refresh_tokens.insert(refresh_token.clone(), user.id.clone());
        Ok(AuthSession {
            access_token,
            refresh_token,
            expires_at: Some(expires_at),
            user,
        })
    }

    fn email_for(state: &State, user_id: &str) -> Option<String> {
        state
            .accounts
            .iter()
            .find(|(_, account)| account.user_id == user_id)
            .map(|(email, _)| email.clone())
    }
}

#[rocket::async_trait]
impl RemoteStore for MemoryStore {
    async fn select(&self, _auth: &Bearer, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut state = self.lock();
        state.queries.push(query.clone());
        Self::check_table(&state, &query.table)?;

        let mut rows: Vec<Value> = state
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_cells(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                if order.ascending { ordering } else { ordering.reverse() }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows.iter().map(|row| project(row, &query.columns)).collect())
    }

    async fn insert(&self, _auth: &Bearer, table: &str, row: Value) -> Result<Value, StoreError> {
        let mut state = self.lock();
        Self::check_table(&state, table)?;
        let rows = state.tables.entry(table.to_string()).or_default();

        let mut row = row;
        let object = row.as_object_mut().ok_or_else(|| StoreError::Rejected {
            status: 400,
            message: format!("{} rows must be JSON objects", table),
        })?;
        if !object.contains_key("id") || object["id"].is_null() {
            let next_id = rows
                .iter()
                .filter_map(|r| r.get("id").and_then(Value::as_i64))
                .max()
                .unwrap_or(0)
                + 1;
            object.insert("id".to_string(), json!(next_id));
        }
        if table == MAINTENANCE_REQUESTS && !object.contains_key("created_at") {
            object.insert("created_at".to_string(), json!(Utc::now().to_rfc3339()));
        }

        rows.push(row.clone());
        Ok(row)
    }

    async fn upsert(
        &self,
        auth: &Bearer,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> Result<Value, StoreError> {
        let key = row.get(on_conflict).cloned().unwrap_or(Value::Null);
        {
            let mut state = self.lock();
            Self::check_table(&state, table)?;
            if let Some(existing) = state
                .tables
                .entry(table.to_string())
                .or_default()
                .iter_mut()
                .find(|r| !key.is_null() && r.get(on_conflict) == Some(&key))
            {
                merge(existing, &row);
                return Ok(existing.clone());
            }
        }
        self.insert(auth, table, row).await
    }

    async fn update(
        &self,
        _auth: &Bearer,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let mut state = self.lock();
        Self::check_table(&state, table)?;
        let rows = state.tables.entry(table.to_string()).or_default();
        let mut updated = Vec::new();
        for row in Self::matching(rows, filters) {
            merge(row, &patch);
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, _auth: &Bearer, table: &str, filters: &[Filter]) -> Result<usize, StoreError> {
        let mut state = self.lock();
        Self::check_table(&state, table)?;
        let rows = state.tables.entry(table.to_string()).or_default();
        let before = rows.len();
        rows.retain(|row| !filters.iter().all(|f| f.matches(row)));
        Ok(before - rows.len())
    }
}

#[rocket::async_trait]
impl AuthProvider for MemoryStore {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let mut state = self.lock();
        let valid = state
            .accounts
            .get(email)
            .map(|account| account.password == password)
            .unwrap_or(false);
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }
        Self::issue_session(&mut state, email)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<(AuthUser, Option<AuthSession>), AuthError> {
        let mut state = self.lock();
        if state.accounts.contains_key(email) {
            return Err(AuthError::Rejected("User already registered".to_string()));
        }
        let user_id = Uuid::new_v4().to_string();
        let full_name = Some(metadata.full_name.clone()).filter(|n| !n.is_empty());
        state.accounts.insert(
            email.to_string(),
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
                full_name: full_name.clone(),
            },
        );
        // Accounts wait for email confirmation, so no session yet.
        Ok((
            AuthUser {
                id: user_id,
                email: email.to_string(),
                full_name,
            },
            None,
        ))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let mut state = self.lock();
        if let Some(grant) = state.access_tokens.remove(access_token) {
            state.refresh_tokens.retain(|_, user_id| *user_id != grant.user_id);
        }
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let state = self.lock();
        let grant = state
            .access_tokens
            .get(access_token)
            .filter(|grant| grant.expires_at > Utc::now())
            .ok_or(AuthError::SessionExpired)?;
        let email = Self::email_for(&state, &grant.user_id).ok_or(AuthError::SessionExpired)?;
        let full_name = state.accounts.get(&email).and_then(|a| a.full_name.clone());
        Ok(AuthUser {
            id: grant.user_id.clone(),
            email,
            full_name,
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let mut state = self.lock();
        let user_id = state
            .refresh_tokens
            .remove(refresh_token)
            .ok_or(AuthError::SessionExpired)?;
        let email = Self::email_for(&state, &user_id).ok_or(AuthError::SessionExpired)?;
        Self::issue_session(&mut state, &email)
    }
}

const DEMO_ACCOUNTS: [(&str, &str, &str); 3] = [
    ("alex@gearguard.test", "2b7f7c1e-0c55-4a53-9a8c-0d3c8b1f0a01", "Alex Johnson"),
    ("sarah@gearguard.test", "6a1d5e0b-93a4-4d3c-8f0e-5b7e9c2d4a02", "Sarah Chen"),
    ("mike@gearguard.test", "9c3e2f1a-7b6d-4e5c-a4b3-2d1f0e9c8b03", "Mike Ross"),
];

fn demo_tables() -> Vec<(&'static str, Vec<Value>)> {
    let [alex, sarah, mike] = DEMO_ACCOUNTS.map(|(_, id, _)| id);
    let emma = "e4d3c2b1-a0f9-4e8d-b7c6-5a4b3c2d1e04";

    let profiles = vec![
        json!({"id": alex, "full_name": "Alex Johnson", "role": "manager", "email": "alex@gearguard.test", "team_id": 1}),
        json!({"id": sarah, "full_name": "Sarah Chen", "role": "technician", "email": "sarah@gearguard.test", "team_id": 1}),
        json!({"id": mike, "full_name": "Mike Ross", "role": "technician", "email": "mike@gearguard.test", "team_id": 2}),
        json!({"id": emma, "full_name": "Emma Wilson", "role": "employee", "email": "emma@gearguard.test", "team_id": null}),
    ];

    let teams = vec![
        json!({"id": 1, "name": "Mechanics", "company": "Gear Guard Manufacturing"}),
        json!({"id": 2, "name": "IT Support", "company": "Gear Guard Manufacturing"}),
        json!({"id": 3, "name": "Electricians", "company": null}),
    ];

    let equipment = vec![
        json!({"id": 7, "name": "Drill Press", "category": "Machinery", "serial_number": "DP-2231", "department": "Production", "employee": "Emma Wilson", "technician_id": sarah, "company": "Gear Guard Manufacturing", "health_percentage": 82.0}),
        json!({"id": 12, "name": "CNC Lathe", "category": "Machinery", "serial_number": "CNC-0042", "department": "Production", "employee": null, "technician_id": sarah, "company": "Gear Guard Manufacturing", "health_percentage": 24.0}),
        json!({"id": 3, "name": "Forklift", "category": "Vehicles", "serial_number": "FL-118", "department": "Logistics", "employee": null, "technician_id": mike, "company": "Gear Guard Manufacturing", "health_percentage": 64.0}),
        json!({"id": 5, "name": "Air Compressor", "category": null, "serial_number": null, "department": "Production", "employee": null, "technician_id": null, "company": null, "health_percentage": 91.0}),
        json!({"id": 9, "name": "Dell Latitude 5440", "category": "Computers", "serial_number": "DL-5440-17", "department": "Office", "employee": "Alex Johnson", "technician_id": mike, "company": "Gear Guard Manufacturing", "health_percentage": 45.0}),
    ];

    let work_centers = vec![
        json!({"id": 1, "name": "Assembly Line 1", "code": "AL-01", "tag": "assembly", "alternative_workcenters": "Assembly Line 2", "cost_per_hour": 120.0, "capacity": 100.0, "time_efficiency": 95.0, "oee_target": 85.0}),
        json!({"id": 2, "name": "Assembly Line 2", "code": "AL-02", "tag": "assembly", "alternative_workcenters": "Assembly Line 1", "cost_per_hour": 110.0, "capacity": 80.0, "time_efficiency": 90.0, "oee_target": 80.0}),
        json!({"id": 3, "name": "Paint Shop", "code": "PS-01", "tag": null, "alternative_workcenters": null, "cost_per_hour": 75.5, "capacity": 40.0, "time_efficiency": null, "oee_target": 70.0}),
    ];

    let requests = vec![
        json!({"id": 1, "subject": "Spindle vibration", "description": "Noticeable wobble above 2000 rpm", "created_by": alex, "technician_id": sarah, "scheduled_date": "2025-03-15T09:00:00Z", "duration_hours": 2.0, "equipment_id": 7, "work_center_id": 1, "priority": "high", "request_type": "corrective", "stage": "new", "created_at": "2025-03-01T08:00:00Z"}),
        json!({"id": 2, "subject": "Hydraulic leak", "description": null, "created_by": alex, "technician_id": mike, "scheduled_date": "2025-03-15T13:30:00Z", "duration_hours": 3.5, "equipment_id": 3, "work_center_id": null, "priority": "medium", "request_type": "corrective", "stage": "in_progress", "created_at": "2025-03-02T10:15:00Z"}),
        json!({"id": 3, "subject": "Quarterly lubrication", "description": "Routine service", "created_by": sarah, "technician_id": sarah, "scheduled_date": "2025-03-22T07:00:00Z", "duration_hours": 1.0, "equipment_id": 12, "work_center_id": 2, "priority": "low", "request_type": "preventive", "stage": "repaired", "created_at": "2025-03-03T12:00:00Z"}),
        json!({"id": 4, "subject": "Replace battery", "description": null, "created_by": emma, "technician_id": null, "scheduled_date": null, "duration_hours": null, "equipment_id": 9, "work_center_id": null, "priority": "low", "request_type": "corrective", "stage": null, "created_at": "2025-03-04T09:45:00Z"}),
        json!({"id": 5, "subject": "Filter change", "description": null, "created_by": mike, "technician_id": mike, "scheduled_date": "2025-04-02T08:00:00Z", "duration_hours": 0.5, "equipment_id": 5, "work_center_id": 3, "priority": "medium", "request_type": "preventive", "stage": "done", "created_at": "2025-03-05T16:20:00Z"}),
    ];

    vec![
        (PROFILES, profiles),
        (TEAMS, teams),
        (EQUIPMENT, equipment),
        (WORK_CENTERS, work_centers),
        (MAINTENANCE_REQUESTS, requests),
    ]
}
