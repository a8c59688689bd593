use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/days/:day/complete", post(handlers::complete_form))
        .route("/days/:day/favorite", post(handlers::favorite_form))
        .route("/days/:day/reaction", post(handlers::react_form))
        .route("/reset", post(handlers::reset_form))
        .route("/api/progress", get(handlers::get_progress))
        .route("/api/days/:day", get(handlers::get_day))
        .route("/api/days/:day/complete", post(handlers::complete))
        .route("/api/days/:day/favorite", post(handlers::favorite))
        .route("/api/days/:day/reaction", post(handlers::react))
        .route("/api/reset", post(handlers::reset))
        .with_state(state)
}
