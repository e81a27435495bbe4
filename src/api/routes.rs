use crate::api::{handlers, pages, AppState};
use crate::session::session_middleware;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main router
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    let sessions = state.sessions.clone();

    Router::new()
        // Pages
        .route("/", get(pages::home))
        .route("/analytics", get(pages::analytics))
        .route("/reports", get(pages::reports))
        // Prediction API
        .route("/predict", post(handlers::predict))
        .route("/clear_prediction", post(handlers::clear_prediction))
        // Operations
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .nest_service("/static", static_files)
        // Add state
        .with_state(state)
        // Add middleware
        .layer(middleware::from_fn_with_state(sessions, session_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
}
