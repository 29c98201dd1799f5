use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{RegisterRequest, SignInRequest},
        services::{self, format_cnic, is_valid_cnic, AuthError},
    },
    session::SessionUser,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
}

fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::NotRegistered | AuthError::NameMismatch => StatusCode::UNAUTHORIZED,
        AuthError::AlreadyRegistered => StatusCode::CONFLICT,
        AuthError::BackendUnavailable => StatusCode::BAD_GATEWAY,
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SessionUser>, (StatusCode, String)> {
    let cnic_id = format_cnic(&payload.cnic_id);
    if !is_valid_cnic(&cnic_id) {
        warn!(%cnic_id, "malformed CNIC");
        return Err((StatusCode::BAD_REQUEST, "Invalid CNIC".into()));
    }

    let user = services::sign_in(
        state.profiles.as_ref(),
        &state.sessions,
        &cnic_id,
        payload.full_name.as_deref(),
    )
    .await
    .map_err(|e| (status_for(&e), e.to_string()))?;

    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<SessionUser>, (StatusCode, String)> {
    let cnic_id = format_cnic(&payload.cnic_id);
    if !is_valid_cnic(&cnic_id) {
        warn!(%cnic_id, "malformed CNIC");
        return Err((StatusCode::BAD_REQUEST, "Invalid CNIC".into()));
    }

    let full_name = payload.full_name.trim();
    if full_name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Full name is required".into()));
    }

    let user = services::register(
        state.profiles.as_ref(),
        &state.sessions,
        &cnic_id,
        full_name,
    )
    .await
    .map_err(|e| (status_for(&e), e.to_string()))?;

    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> StatusCode {
    services::sign_out(&state.sessions);
    StatusCode::NO_CONTENT
}

/// Restore the persisted session without touching the database.
#[instrument(skip(state))]
pub async fn session(State(state): State<AppState>) -> Json<Option<SessionUser>> {
    Json(services::restore(&state.sessions))
}
