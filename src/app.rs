use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/sheet", get(handlers::get_sheet))
        .route("/api/today", get(handlers::get_today))
        .route("/api/year-goal", put(handlers::put_year_goal))
        .route("/api/start-date", put(handlers::put_start_date))
        .route("/api/weeks/:week_id", get(handlers::get_week))
        .route("/api/weeks/:week_id/title", put(handlers::put_week_title))
        .route("/api/logs/:date", put(handlers::put_log))
        .route("/api/logs/:date/tasks", post(handlers::add_task))
        .route(
            "/api/logs/:date/tasks/:task_id",
            axum::routing::delete(handlers::delete_task),
        )
        .route("/api/logs/:date/coach", post(handlers::request_coach))
        .route("/api/coach/pending", get(handlers::get_coaching))
        .route(
            "/api/sidebar",
            get(handlers::get_sidebar).put(handlers::put_sidebar),
        )
        .route("/api/export", get(handlers::export))
        .route("/api/import", post(handlers::import))
        .with_state(state)
}
