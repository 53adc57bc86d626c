pub mod advertisements;
pub mod config;
pub mod error;
pub mod state;
pub mod validation;
pub mod workflow;

use axum::{
    Router,
    routing::{get, patch, post},
};

pub use config::ApiConfig;
pub use error::AdvertError;
pub use state::{AppState, AppStateInner};

/// All advertisement routes plus a liveness probe.
/// Transport layers (tracing, CORS) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/advertisements/", post(advertisements::create_advertisement))
        .route("/advertisements/{id}", get(advertisements::get_advertisement))
        .route(
            "/advertisements/{user}/{id}",
            patch(advertisements::update_advertisement).delete(advertisements::delete_advertisement),
        )
        .route("/health", get(advertisements::health))
        .fallback(advertisements::fallback)
        .method_not_allowed_fallback(advertisements::method_not_allowed)
        .with_state(state)
}
