use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/apply", post(handlers::apply))
        .route("/comments/:id", get(handlers::open_comment))
        .route("/modal/close", get(handlers::close_modal))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/metrics", get(handlers::get_metrics))
        .route("/api/comments", get(handlers::get_comments))
        .route("/api/recent-activity", get(handlers::get_recent_activity))
        .route("/api/platform-stats", get(handlers::get_platform_stats))
        .with_state(state)
}
