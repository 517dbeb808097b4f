use crate::state::AppState;
use axum::Router;

pub mod checklist;
pub mod classify;
pub mod consolidate;
pub mod dto;
pub mod fetch;
pub mod handlers;
pub mod services;
pub mod session;

pub fn router() -> Router<AppState> {
    handlers::shopping_routes()
}
