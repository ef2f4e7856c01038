use axum::routing::{get, post};
use axum::Router;

use crate::api;
use crate::auth::session;
use crate::state::AppState;

/// Assemble the HTTP surface.
///
/// Static asset serving and the CORS layer are attached by the binary,
/// which knows the configuration; tests mount this router directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::view::home_handler))
        .route(
            "/api/v1/pages",
            post(api::pages::create_page_handler)
                .get(api::pages::fetch_page_handler)
                .put(api::pages::update_page_handler)
                .delete(api::pages::delete_page_handler),
        )
        .route("/api/v1/search", get(api::search::search_handler))
        .route(
            "/api/v1/feedback",
            post(api::feedback::submit_feedback_handler).get(api::feedback::list_feedback_handler),
        )
        .route(
            "/api/v1/feedback/item",
            get(api::feedback::get_feedback_handler).delete(api::feedback::delete_feedback_handler),
        )
        .route(
            "/api/v1/feedback/item/resolve",
            post(api::feedback::resolve_feedback_handler),
        )
        .route("/api/v1/upload", post(api::upload::upload_handler))
        .route("/api/auth/login", post(session::login_handler))
        .route("/api/auth/register", post(session::register_handler))
        .route("/api/auth/logout", post(session::logout_handler))
        .route("/api/auth/me", get(session::me_handler))
        .route("/admin/{shell}", get(api::shells::admin_shell_handler))
        .route("/{*path}", get(api::view::view_page_handler))
        .with_state(state)
}
