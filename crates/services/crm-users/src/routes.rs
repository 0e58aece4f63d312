//! Route configuration.

use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    middleware,
    response::Json,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::handlers::{health_routes, user_routes};
use crate::middleware::tenant_middleware;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Base path of the user API
pub const USERS_PATH: &str = "/api/v1/users";

/// Create the main router with all routes.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check (no tenant)
        .nest("/health", health_routes())
        .route("/api-docs/openapi.json", get(openapi_json))
        // User routes (tenant required)
        .nest(
            USERS_PATH,
            user_routes().route_layer(middleware::from_fn(tenant_middleware)),
        )
        .layer(cors_layer())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-tenant-id"),
        ])
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
