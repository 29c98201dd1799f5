use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    records::dto::{
        StartTestRequest, StartedTestResponse, TestRecord, UpdateResultRequest,
        UpdateStatusRequest,
    },
    records::{projector, repo},
    state::AppState,
};

pub fn test_routes() -> Router<AppState> {
    Router::new()
        .route("/tests", get(list_tests).post(start_test))
        .route("/tests/:id", get(get_test))
        .route("/tests/:id/status", patch(update_status))
        .route("/tests/:id/result", patch(update_result))
}

/// Full joined listing, newest first. Query failures degrade to an empty
/// list; the dashboard shows its empty state and the user re-navigates.
#[instrument(skip(state))]
pub async fn list_tests(State(state): State<AppState>) -> Json<Vec<TestRecord>> {
    match repo::list_joined(&state.db).await {
        Ok(rows) => Json(rows.into_iter().map(projector::project).collect()),
        Err(e) => {
            error!(error = %e, "listing test records failed");
            Json(Vec::new())
        }
    }
}

/// Point lookup by display identifier (`T007`). Same record shape as the
/// listing; anything that goes wrong is a plain not-found.
#[instrument(skip(state))]
pub async fn get_test(
    State(state): State<AppState>,
    Path(display_id): Path<String>,
) -> Result<Json<TestRecord>, (StatusCode, String)> {
    let not_found = || (StatusCode::NOT_FOUND, "Test not found".to_string());

    let id = projector::parse_display_id(&display_id).ok_or_else(not_found)?;
    match repo::get_joined(&state.db, id).await {
        Ok(Some(row)) => Ok(Json(projector::project(row))),
        Ok(None) => Err(not_found()),
        Err(e) => {
            error!(error = %e, %display_id, "fetching test record failed");
            Err(not_found())
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn start_test(
    State(state): State<AppState>,
    Json(payload): Json<StartTestRequest>,
) -> Result<(StatusCode, Json<StartedTestResponse>), (StatusCode, String)> {
    let id = repo::start_test(&state.db, payload.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %payload.user_id, "starting test failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    Ok((StatusCode::CREATED, Json(StartedTestResponse { id })))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(display_id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = projector::parse_display_id(&display_id)
        .ok_or((StatusCode::NOT_FOUND, "Test not found".to_string()))?;
    let updated = repo::update_status(&state.db, id, &payload.final_result, payload.test_end_time)
        .await
        .map_err(|e| {
            error!(error = %e, id, "updating test status failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    if !updated {
        return Err((StatusCode::NOT_FOUND, "Test not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn update_result(
    State(state): State<AppState>,
    Path(display_id): Path<String>,
    Json(payload): Json<UpdateResultRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = projector::parse_display_id(&display_id)
        .ok_or((StatusCode::NOT_FOUND, "Test not found".to_string()))?;
    let updated = repo::update_result(&state.db, id, payload.result_type, &payload.result)
        .await
        .map_err(|e| {
            error!(error = %e, id, "updating sub-check result failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    if !updated {
        return Err((StatusCode::NOT_FOUND, "Test not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
