use tracing::debug;

use crate::common::auth::{Action, Actor, Resource};
use crate::common::Result;
use crate::domains::audit::data::{AuditListParams, AuditQuery};
use crate::domains::audit::models::AuditLogEntry;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Search the audit trail, most recent first. Admins and reviewers only.
pub async fn query_audit(
    deps: &ServerDeps,
    actor: &User,
    params: AuditListParams,
) -> Result<Vec<AuditLogEntry>> {
    Actor::new(actor)
        .can(Action::QueryAudit)
        .on(Resource::AuditLog)
        .check()?;

    let query = AuditQuery::from_params(params)?;
    let entries = deps.store.query_audit(&query).await?;
    debug!(actor_id = %actor.id, count = entries.len(), "Audit query");
    Ok(entries)
}
