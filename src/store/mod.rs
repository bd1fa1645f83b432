//! Entity Store client.
//!
//! The hosted relational store is consumed through a generic per-table
//! resource interface: select (ordered), insert-or-update keyed by id,
//! delete by id, filter by equality. Row-level security on the server
//! decides what a caller's token can see; nothing is re-filtered here.
//!
//! Modules:
//! - rows: wire row shapes and entity ↔ row mappers
//! - auth: Identity Provider client (sign-in, token verification)

pub mod auth;
pub mod rows;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::Config;

// =============================================================================
// Error type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP: {0}")]
    Http(reqwest::Error),
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    #[error("Store error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Empty response where a row was expected")]
    EmptyResponse,
}

impl StoreError {
    /// The non-fatal message surfaced to callers at the synchronizer
    /// boundary.
    pub fn surface(&self) -> String {
        self.to_string()
    }
}

/// An authenticated caller: the bearer token attached to every request,
/// against which the store evaluates row-level policy.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Session {
            access_token: access_token.into(),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Clone)]
pub struct StoreClient {
    base_url: String,
    anon_key: String,
    http: reqwest::Client,
    timeout_secs: u64,
}

impl StoreClient {
    /// Build a client from configuration. Every request carries the
    /// configured timeout; there is no automatic retry — a failed call
    /// surfaces as "operation did not happen".
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(StoreError::Http)?;
        Ok(StoreClient {
            base_url: config.store_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            http,
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, request: reqwest::RequestBuilder, session: &Session) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    pub(crate) async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let resp = request.send().await.map_err(|err| {
            if err.is_timeout() {
                StoreError::Timeout(self.timeout_secs)
            } else {
                StoreError::Http(err)
            }
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch all rows of `table` visible to the session, ordered by the
    /// store (e.g. "created_at.desc").
    pub async fn select_rows<R: DeserializeOwned>(
        &self,
        session: &Session,
        table: &str,
        order: &str,
    ) -> Result<Vec<R>, StoreError> {
        let request = self
            .authed(self.http.get(self.table_url(table)), session)
            .query(&[("select", "*"), ("order", order)]);
        let resp = self.send(request).await?;
        resp.json::<Vec<R>>().await.map_err(StoreError::Http)
    }

    /// Fetch rows matching an equality filter on one column.
    pub async fn select_eq<R: DeserializeOwned>(
        &self,
        session: &Session,
        table: &str,
        column: &str,
        value: &str,
        order: &str,
    ) -> Result<Vec<R>, StoreError> {
        let filter = format!("eq.{}", value);
        let request = self
            .authed(self.http.get(self.table_url(table)), session)
            .query(&[
                ("select", "*"),
                (column, filter.as_str()),
                ("order", order),
            ]);
        let resp = self.send(request).await?;
        resp.json::<Vec<R>>().await.map_err(StoreError::Http)
    }

    /// Idempotent insert-or-update keyed by primary id. Returns the stored
    /// representation the server sends back.
    pub async fn upsert_row<R>(&self, session: &Session, table: &str, row: &R) -> Result<R, StoreError>
    where
        R: Serialize + DeserializeOwned,
    {
        let request = self
            .authed(self.http.post(self.table_url(table)), session)
            .header(
                "Prefer",
                "resolution=merge-duplicates,return=representation",
            )
            .json(row);
        let resp = self.send(request).await?;
        let mut rows: Vec<R> = resp.json().await.map_err(StoreError::Http)?;
        if rows.is_empty() {
            return Err(StoreError::EmptyResponse);
        }
        Ok(rows.remove(0))
    }

    /// Delete one row by id.
    pub async fn delete_row(
        &self,
        session: &Session,
        table: &str,
        id: &str,
    ) -> Result<(), StoreError> {
        let filter = format!("eq.{}", id);
        let request = self
            .authed(self.http.delete(self.table_url(table)), session)
            .query(&[("id", filter.as_str())]);
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> StoreClient {
        let config = Config {
            store_url: "https://db.example.com/".to_string(),
            anon_key: "anon".to_string(),
            service_role_key: None,
            admin_bootstrap_secret: None,
            bind_addr: "127.0.0.1:0".to_string(),
            request_timeout_secs: 5,
            rate_feed_url: None,
        };
        StoreClient::new(&config).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = test_client();
        assert_eq!(client.base_url(), "https://db.example.com");
        assert_eq!(
            client.table_url("clients"),
            "https://db.example.com/rest/v1/clients"
        );
    }

    #[test]
    fn test_store_error_surface_messages() {
        let err = StoreError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        };
        assert_eq!(err.surface(), "Store error 503: service unavailable");
        assert_eq!(
            StoreError::Timeout(5).surface(),
            "Request timed out after 5 seconds"
        );
    }
}
