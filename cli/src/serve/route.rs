use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use super::{handlers::*, state::AppState};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/users", get(list_handler))
        .route("/users/:username", get(user_handler))
        .route("/add", post(add_handler))
        .route("/edit/:username", post(edit_handler))
        .route("/delete/:username", post(delete_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(Extension(app_state))
}
