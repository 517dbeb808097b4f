use crate::state::AppState;
use axum::Router;

pub mod client;
pub mod dto;
pub mod handlers;
#[cfg(test)]
pub mod mock;

pub fn router() -> Router<AppState> {
    handlers::recipe_routes()
}
