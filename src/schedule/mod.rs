use crate::state::AppState;
use axum::{routing::get, Router};

pub mod day_index;
pub mod dto;
pub mod handlers;
pub mod mapper;
pub mod table;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(handlers::dashboard))
}
