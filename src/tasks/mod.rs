mod dto;
pub mod handlers;
pub mod repo;
pub mod status;

use crate::state::AppState;
use axum::Router;

pub use status::TaskStatus;

pub fn router() -> Router<AppState> {
    handlers::task_routes()
}
