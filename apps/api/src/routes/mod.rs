pub mod health;

use axum::{
    routing::{get, put},
    Router,
};

use crate::moderation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Admin content moderation API
        .route(
            "/api/admin/content/stories",
            get(handlers::handle_list_stories)
                .post(handlers::handle_create_story)
                .put(handlers::handle_decide),
        )
        .route(
            "/api/admin/content/stories/:id",
            get(handlers::handle_get_story),
        )
        .with_state(state)
}
