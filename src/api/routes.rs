use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::resources::resource_router;
use crate::auth::{api as auth_api, require_auth, AuthState, JwtHandler};
use crate::db::RecordStore;
use crate::middleware::request_logging;
use crate::models::{Director, Movie};

/// Shared application state
///
/// Every store handle is opened once at startup and cloned into the routers
/// that need it.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub movies: RecordStore<Movie>,
    pub directors: RecordStore<Director>,
}

impl AppState {
    pub fn jwt_handler(&self) -> Arc<JwtHandler> {
        self.auth.jwt_handler.clone()
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let jwt_handler = state.jwt_handler();

    let auth_router = Router::new()
        .route("/auth/register", post(auth_api::register))
        .route("/auth/register-admin", post(auth_api::register_admin))
        .route("/auth/login", post(auth_api::login))
        .with_state(state.auth);

    let identity_routes = Router::new()
        .route("/auth/me", get(auth_api::me))
        .route_layer(middleware::from_fn_with_state(
            jwt_handler.clone(),
            require_auth,
        ));

    let public_routes = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(auth_router)
        .merge(identity_routes)
        .merge(resource_router(state.movies, jwt_handler.clone()))
        .merge(resource_router(state.directors, jwt_handler))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

// ===== Route Handlers =====

async fn welcome() -> &'static str {
    "Welcome to the movie and director API"
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
