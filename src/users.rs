use axum::{extract::State, routing::get, Json, Router};
use tracing::{error, instrument};

use crate::{auth::repo::Profile, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

/// All registered candidates, newest first. Search filtering stays in the
/// dashboard, which works over the full in-memory list.
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<Profile>> {
    match state.profiles.list().await {
        Ok(profiles) => Json(profiles),
        Err(e) => {
            error!(error = %e, "listing profiles failed");
            Json(Vec::new())
        }
    }
}
