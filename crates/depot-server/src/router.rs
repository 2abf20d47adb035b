use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::handler;
use crate::middleware::timed;
use crate::state::AppState;

/// Build the axum router with all Depot endpoints.
pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route(endpoints::ROOT, timed("root", get(handler::root_handler)))
        .route(
            endpoints::FILES,
            timed("list_files", get(handler::list_files))
                .merge(timed("store_file", post(handler::store_file))),
        )
        .route(endpoints::FILE, timed("get_file", get(handler::get_file)))
        .route(endpoints::HEALTH, timed("health_check", get(handler::health_handler)))
        .route(endpoints::METRICS, timed("metrics", get(handler::metrics_handler)))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
