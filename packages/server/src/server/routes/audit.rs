use axum::{
    extract::{Extension, Query},
    Json,
};

use crate::common::Result;
use crate::domains::audit::actions::query_audit;
use crate::domains::audit::data::AuditListParams;
use crate::domains::audit::models::AuditLogEntry;
use crate::server::app::AppState;
use crate::server::middleware::CurrentUser;

pub async fn audit_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<AuditListParams>,
) -> Result<Json<Vec<AuditLogEntry>>> {
    Ok(Json(query_audit(&state.deps, &user, params).await?))
}
