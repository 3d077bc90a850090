pub mod auth;
pub mod babysitters;
pub mod bookings;
pub mod convert;
pub mod directory;
pub mod error;
pub mod fixtures;
pub mod messages;
pub mod middleware;
pub mod profiles;
pub mod reviews;
pub mod sessions;
pub mod state;

use axum::{
    Json, Router,
    routing::{get, patch, post},
};
use tracing::error;

pub use error::{ApiError, ApiResult};
pub use state::{ApiSettings, AppState, AppStateInner};

use crate::middleware::require_auth;

/// Build the full HTTP surface. Transport layers (CORS, tracing) are added
/// by the server binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::current_session))
        .route("/auth/events", get(auth::session_events))
        .route("/profile", get(profiles::get_profile).put(profiles::save_profile))
        .route("/babysitters", get(babysitters::list_babysitters))
        .route("/babysitters/{id}", get(babysitters::get_babysitter))
        .route("/babysitters/{id}/reviews", get(reviews::list_reviews))
        .route("/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route("/bookings/{booking_id}/status", patch(bookings::update_status))
        .route(
            "/bookings/{booking_id}/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route("/bookings/{booking_id}/messages/read", post(messages::mark_read))
        .route("/bookings/{booking_id}/reviews", post(reviews::create_review))
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run store work on the blocking pool.
pub(crate) async fn run_blocking<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&AppStateInner) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal("blocking task failed".into())
        })?
        .map_err(ApiError::Store)
}
