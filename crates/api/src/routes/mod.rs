//! HTTP routing

pub mod auth;
pub mod health;
pub mod users;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::require_auth;
use crate::state::AppState;

/// Success envelope: `{"status": "success", "message": ..., "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data,
        }
    }
}

/// Build the application router.
///
/// `/login`, `/logout` and `/health` are public; everything else sits behind
/// [`require_auth`], which rejects before the route handler runs.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/me", get(users::me))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_auth,
        ));

    // Logout stays outside the gate: it only needs an intact signature, and
    // must keep working after an audience/issuer policy change.
    Router::new()
        .route("/health", get(health::health))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(state.config.cors_allowed_origin.as_deref()))
        .with_state(state)
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    match allowed_origin.and_then(|origin| origin.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new().allow_origin(origin),
        None => CorsLayer::permissive(),
    }
}
