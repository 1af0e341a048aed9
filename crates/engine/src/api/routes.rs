use axum::{
    routing::{get, post},
    Router,
};

use super::{handlers, AppState};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health_check))
        .route("/chat/invoke", post(handlers::invoke_chat))
}
