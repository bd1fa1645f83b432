//! Administrative HTTP surface.
//!
//! Internal endpoints consumed by the UI: admin bootstrap, role-aware user
//! creation, profile updates, idempotent profile materialization, and a
//! health check. Every endpoint except health requires a bearer token.
//! Responses are `{ok: true, ...}` or `{error: string}` with the error
//! message passed through verbatim.

pub mod handlers;
pub mod routes;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::CrmError;
use crate::store::auth::AuthUser;
use crate::store::{Session, StoreClient};
use crate::types::Config;

/// Shared state for the admin router.
#[derive(Clone)]
pub struct AdminState {
    pub store: StoreClient,
    pub config: Config,
}

impl AdminState {
    /// Session backed by the service-role key, for writes that must not
    /// depend on the caller's row visibility.
    pub fn service_session(&self) -> Result<Session, CrmError> {
        let key = self
            .config
            .service_role_key
            .as_ref()
            .ok_or_else(|| CrmError::Unexpected("service role key not configured".to_string()))?;
        Ok(Session::new(key.clone()))
    }
}

/// Handler error: a `CrmError` rendered as `(status, {error})`.
#[derive(Debug)]
pub struct AppError(pub CrmError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<CrmError> for AppError {
    fn from(err: CrmError) -> Self {
        AppError(err)
    }
}

/// Pull the bearer token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, CrmError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(CrmError::Unauthenticated)?;
    let token = value.strip_prefix("Bearer ").ok_or(CrmError::Unauthenticated)?;
    if token.is_empty() {
        return Err(CrmError::Unauthenticated);
    }
    Ok(token.to_string())
}

/// Resolve the caller's bearer token to an identity. A provider rejection
/// is an authentication failure, not a transport one.
pub async fn authenticate(state: &AdminState, headers: &HeaderMap) -> Result<(AuthUser, Session), CrmError> {
    let token = bearer_token(headers)?;
    let user = state.store.get_user(&token).await.map_err(|err| {
        match CrmError::from(err) {
            CrmError::Store { status: 401 | 403, .. } => CrmError::Unauthenticated,
            other => other,
        }
    })?;
    Ok((user, Session::new(token)))
}
