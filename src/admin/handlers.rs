//! Admin route handlers.
//!
//! Endpoints:
//! - `POST /admin/bootstrap`      — One-time admin creation (shared secret)
//! - `POST /admin/users`          — Role-aware user creation (protected)
//! - `PATCH /admin/profile`       — Update own profile (protected)
//! - `POST /admin/profile/ensure` — Idempotent profile upsert (protected)
//! - `GET  /health`               — Configuration presence booleans (public)

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{authenticate, AdminState, AppError};
use crate::error::CrmError;
use crate::services::directory;
use crate::store::rows::Mapped;
use crate::types::{Profile, Role};

// ============================================================================
// Request / Response types
// ============================================================================

/// Request body for POST /admin/bootstrap
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapRequest {
    pub secret: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Request body for POST /admin/users
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub promoter_id: Option<String>,
}

/// Request body for PATCH /admin/profile — absent fields stay unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub promoter_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub ok: bool,
    pub profile: Profile,
}

/// Response for GET /health — presence booleans only, never values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub store_configured: bool,
    pub service_role_configured: bool,
    pub bootstrap_secret_configured: bool,
    pub rate_feed_configured: bool,
}

// ============================================================================
// Helpers
// ============================================================================

async fn load_profile(
    state: &AdminState,
    session: &crate::store::Session,
    id: &str,
) -> Result<Option<Profile>, CrmError> {
    let rows = state
        .store
        .select_eq::<<Profile as Mapped>::Row>(session, Profile::TABLE, "id", id, Profile::ORDER)
        .await?;
    Ok(rows.into_iter().next().map(Profile::from_row))
}

async fn load_all_profiles(
    state: &AdminState,
    session: &crate::store::Session,
) -> Result<Vec<Profile>, CrmError> {
    let rows = state
        .store
        .select_rows::<<Profile as Mapped>::Row>(session, Profile::TABLE, Profile::ORDER)
        .await?;
    Ok(rows.into_iter().map(Profile::from_row).collect())
}

async fn store_profile(
    state: &AdminState,
    session: &crate::store::Session,
    profile: &Profile,
) -> Result<Profile, CrmError> {
    let row = state
        .store
        .upsert_row(session, Profile::TABLE, &profile.to_row())
        .await?;
    Ok(Profile::from_row(row))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health — reports which configuration is present. No auth, no
/// secret values.
pub async fn health(State(state): State<AdminState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        store_configured: !state.config.store_url.is_empty() && !state.config.anon_key.is_empty(),
        service_role_configured: state.config.service_role_key.is_some(),
        bootstrap_secret_configured: state.config.admin_bootstrap_secret.is_some(),
        rate_feed_configured: state.config.rate_feed_url.is_some(),
    })
}

/// POST /admin/bootstrap — create the first admin, guarded by the static
/// shared secret. 409 when an admin already exists.
pub async fn bootstrap(
    State(state): State<AdminState>,
    Json(body): Json<BootstrapRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let expected = state
        .config
        .admin_bootstrap_secret
        .as_deref()
        .ok_or_else(|| CrmError::Forbidden("bootstrap is not enabled".to_string()))?;
    if body.secret != expected {
        return Err(CrmError::Unauthenticated.into());
    }

    directory::validate_email(&body.email).map_err(CrmError::Validation)?;
    directory::validate_password(&body.password).map_err(CrmError::Validation)?;

    let service = state.service_session()?;
    let existing_admin = load_all_profiles(&state, &service)
        .await?
        .into_iter()
        .any(|p| p.role == Role::Admin);
    if existing_admin {
        return Err(CrmError::Conflict("an admin user already exists".to_string()).into());
    }

    let service_key = service.access_token.clone();
    let identity = state
        .store
        .admin_create_identity(&service_key, &body.email, &body.password)
        .await
        .map_err(CrmError::from)?;

    let profile = directory::new_profile(
        &identity.id,
        &body.email,
        &body.name,
        Role::Admin,
        None,
        None,
    );
    let stored = store_profile(&state, &service, &profile).await?;
    log::info!("bootstrap: created admin {}", stored.id);
    Ok((
        StatusCode::CREATED,
        Json(ProfileResponse {
            ok: true,
            profile: stored,
        }),
    ))
}

/// POST /admin/users — create a user. The caller may only create
/// subordinate roles, and the new profile's hierarchy references must
/// check out.
pub async fn create_user(
    State(state): State<AdminState>,
    headers: HeaderMap,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let (auth_user, session) = authenticate(&state, &headers).await?;

    directory::validate_email(&body.email).map_err(CrmError::Validation)?;
    directory::validate_password(&body.password).map_err(CrmError::Validation)?;

    let caller = load_profile(&state, &session, &auth_user.id)
        .await?
        .ok_or_else(|| CrmError::Forbidden("caller has no profile".to_string()))?;
    if !directory::can_create(caller.role, body.role) {
        return Err(CrmError::Forbidden(format!(
            "a {} may not create a {}",
            caller.role.as_str(),
            body.role.as_str()
        ))
        .into());
    }

    let service = state.service_session()?;
    let all_users = load_all_profiles(&state, &service).await?;
    directory::validate_hierarchy(
        body.role,
        body.manager_id.as_deref(),
        body.promoter_id.as_deref(),
        &all_users,
    )
    .map_err(CrmError::Validation)?;

    let service_key = service.access_token.clone();
    let identity = state
        .store
        .admin_create_identity(&service_key, &body.email, &body.password)
        .await
        .map_err(CrmError::from)?;

    let profile = directory::new_profile(
        &identity.id,
        &body.email,
        &body.name,
        body.role,
        body.manager_id.clone(),
        body.promoter_id.clone(),
    );
    let stored = store_profile(&state, &service, &profile).await?;
    log::info!(
        "create_user: {} created {} ({})",
        caller.id,
        stored.id,
        stored.role.as_str()
    );
    Ok((
        StatusCode::CREATED,
        Json(ProfileResponse {
            ok: true,
            profile: stored,
        }),
    ))
}

/// PATCH /admin/profile — update the caller's own profile. A role change
/// is gated by the caller's current role (never upward).
pub async fn update_profile(
    State(state): State<AdminState>,
    headers: HeaderMap,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let (auth_user, session) = authenticate(&state, &headers).await?;
    let mut profile = load_profile(&state, &session, &auth_user.id)
        .await?
        .ok_or_else(|| CrmError::Validation("profile does not exist".to_string()))?;

    if let Some(new_role) = body.role {
        if !directory::can_change_role(profile.role, new_role) {
            return Err(CrmError::Forbidden(format!(
                "a {} may not become a {}",
                profile.role.as_str(),
                new_role.as_str()
            ))
            .into());
        }
        profile.role = new_role;
    }
    if let Some(name) = body.name {
        profile.name = name;
    }
    if let Some(username) = body.username {
        profile.username = Some(username);
    }
    if body.manager_id.is_some() {
        profile.manager_id = body.manager_id.clone();
    }
    if body.promoter_id.is_some() {
        profile.promoter_id = body.promoter_id.clone();
    }

    let all_users = load_all_profiles(&state, &session).await?;
    directory::validate_hierarchy(
        profile.role,
        profile.manager_id.as_deref(),
        profile.promoter_id.as_deref(),
        &all_users,
    )
    .map_err(CrmError::Validation)?;

    let stored = store_profile(&state, &session, &profile).await?;
    Ok(Json(ProfileResponse {
        ok: true,
        profile: stored,
    }))
}

/// POST /admin/profile/ensure — materialize a profile for the
/// authenticated identity if none exists yet. Idempotent.
pub async fn ensure_profile(
    State(state): State<AdminState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, AppError> {
    let (auth_user, session) = authenticate(&state, &headers).await?;
    let existing = load_profile(&state, &session, &auth_user.id).await?;
    let already_present = existing.is_some();
    let profile = directory::ensure_profile(&auth_user, existing);
    let stored = if already_present {
        profile
    } else {
        store_profile(&state, &session, &profile).await?
    };
    Ok(Json(ProfileResponse {
        ok: true,
        profile: stored,
    }))
}
