//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    add_version_handler, audit_handler, create_artefact_handler, create_region_handler,
    get_artefact_handler, get_user_handler, health_handler, list_artefacts_handler,
    list_regions_handler, login_handler, me_handler, register_handler,
    transition_artefact_handler, update_artefact_handler, update_user_handler,
};

/// Standard request deadline
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, allowed_origins: &[String]) -> Router {
    let deps = Arc::new(deps);
    let jwt_service = deps.jwt_service.clone();
    let app_state = AppState { deps };

    let router = Router::new()
        // Public
        .route("/health", get(health_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/regions", get(list_regions_handler).post(create_region_handler))
        // Authenticated (CurrentUser rejects with 401)
        .route("/me", get(me_handler))
        .route("/users/:id", get(get_user_handler).patch(update_user_handler))
        .route(
            "/artefacts",
            get(list_artefacts_handler).post(create_artefact_handler),
        )
        .route(
            "/artefacts/:id",
            get(get_artefact_handler).patch(update_artefact_handler),
        )
        .route("/artefacts/:id/versions", post(add_version_handler))
        .route(
            "/artefacts/:id/transitions/:event",
            post(transition_artefact_handler),
        )
        .route("/audit", get(audit_handler));

    // Middleware layers (applied in reverse order - last added runs first)
    router
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// `*` or an empty list allows any origin
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}
