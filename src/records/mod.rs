use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod projector;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::test_routes()
}
