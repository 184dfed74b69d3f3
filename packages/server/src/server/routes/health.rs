use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use tracing::error;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    store: StoreHealth,
}

#[derive(Serialize)]
pub struct StoreHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Pings the backing store. Returns 200 OK if it answers within 5 seconds,
/// 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store_health = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state.deps.store.ping(),
    )
    .await
    {
        Ok(Ok(())) => StoreHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => {
            error!(error = %e, "Store ping failed");
            StoreHealth {
                status: "error".to_string(),
                error: Some("Ping failed".to_string()),
            }
        }
        Err(_) => {
            error!("Store ping timed out");
            StoreHealth {
                status: "error".to_string(),
                error: Some("Ping timeout (>5s)".to_string()),
            }
        }
    };

    let is_healthy = store_health.status == "ok";
    let (status_code, overall_status) = if is_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall_status.to_string(),
            store: store_health,
        }),
    )
}
