//! Access to the remote data store.
//!
//! The managed backend exposes row-filtered selects ("where column equals
//! value", "where column is in set") plus insert/update/delete over HTTP.
//! [`RemoteStore`] is the seam every entity function in this module goes
//! through; rows cross it as JSON and are decoded into typed records right
//! at the boundary with [`decode_rows`].
//!
//! Two implementations exist: [`PostgrestStore`] talks to the hosted
//! service, [`MemoryStore`] keeps tables in process for demos and tests.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub mod auth;
pub mod equipment;
pub mod maintenance_request;
pub mod memory;
pub mod postgrest;
pub mod profile;
pub mod team;
pub mod work_center;

pub use auth::{AuthError, AuthProvider, AuthSession, AuthUser};
pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

pub const MAINTENANCE_REQUESTS: &str = "maintenance_requests";
pub const EQUIPMENT: &str = "equipment";
pub const PROFILES: &str = "profiles";
pub const TEAMS: &str = "teams";
pub const WORK_CENTERS: &str = "work_centers";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("remote store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to decode {table} row: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("remote store returned no {table} row")]
    MissingRow { table: String },

    #[error("table {0} is unavailable")]
    Unavailable(String),

    #[error("remote store is not configured: {0}")]
    Config(String),
}

impl StoreError {
    /// HTTP status a service should answer with when this error surfaces.
    pub fn http_status(&self) -> u16 {
        match self {
            StoreError::Rejected { status, .. } if (400..500).contains(status) => *status,
            StoreError::Rejected { .. } | StoreError::Transport(_) | StoreError::Unavailable(_) => 502,
            StoreError::Decode { .. } | StoreError::MissingRow { .. } | StoreError::Config(_) => 500,
        }
    }
}

/// Credentials attached to a store call. Anonymous calls fall back to the
/// project's public key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bearer(Option<String>);

impl Bearer {
    pub fn anonymous() -> Self {
        Bearer(None)
    }

    pub fn token(access_token: impl Into<String>) -> Self {
        Bearer(Some(access_token.into()))
    }

    pub fn as_token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(column.to_string(), value.into())
    }

    pub fn is_in<V: Into<Value>>(column: &str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(column.to_string(), values.into_iter().map(Into::into).collect())
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(column, _) | Filter::In(column, _) => column,
        }
    }

    /// Whether a JSON row satisfies this filter.
    pub fn matches(&self, row: &Value) -> bool {
        let cell = row.get(self.column()).unwrap_or(&Value::Null);
        match self {
            Filter::Eq(_, value) => cell == value,
            Filter::In(_, values) => values.iter().any(|v| v == cell),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A select against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn from(table: &str) -> Self {
        Query {
            table: table.to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn is_in<V: Into<Value>>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.filters.push(Filter::is_in(column, values));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order { column: column.to_string(), ascending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Comma-separated column list, `*` when none were chosen.
    pub fn column_list(&self) -> String {
        if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        }
    }
}

/// Row-level operations of the remote store.
#[rocket::async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(&self, auth: &Bearer, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Inserts one row and returns it as stored (with generated columns).
    async fn insert(&self, auth: &Bearer, table: &str, row: Value) -> Result<Value, StoreError>;

    /// Inserts or merges one row keyed by `on_conflict`.
    async fn upsert(
        &self,
        auth: &Bearer,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> Result<Value, StoreError>;

    /// Applies `patch` to every matching row and returns the updated rows.
    async fn update(
        &self,
        auth: &Bearer,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Deletes every matching row and returns how many went away.
    async fn delete(&self, auth: &Bearer, table: &str, filters: &[Filter]) -> Result<usize, StoreError>;
}

pub fn decode_row<T: DeserializeOwned>(table: &str, row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|source| StoreError::Decode {
        table: table.to_string(),
        source,
    })
}

pub fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter().map(|row| decode_row(table, row)).collect()
}

pub fn encode_row<T: serde::Serialize>(table: &str, row: &T) -> Result<Value, StoreError> {
    serde_json::to_value(row).map_err(|source| StoreError::Decode {
        table: table.to_string(),
        source,
    })
}
