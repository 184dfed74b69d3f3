use chrono::Utc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::common::{Error, Result};
use crate::domains::audit::models::{AuditAction, AuditLogEntry, TargetType};
use crate::domains::users::models::User;
use crate::kernel::{BaseStore, Mutation, StoreError};

/// Append a standalone audit entry.
pub async fn record(
    store: &dyn BaseStore,
    action: AuditAction,
    actor: &User,
    target_type: TargetType,
    target_id: impl Into<Uuid>,
    details: serde_json::Value,
) -> Result<AuditLogEntry> {
    record_with(store, Vec::new(), action, actor, target_type, target_id, details).await
}

/// Apply `mutations` and append the matching audit entry as one unit.
///
/// A store failure aborts both: nothing is written and the caller gets
/// `StoreUnavailable` (or `Conflict` when a guard did not hold).
pub async fn record_with(
    store: &dyn BaseStore,
    mutations: Vec<Mutation>,
    action: AuditAction,
    actor: &User,
    target_type: TargetType,
    target_id: impl Into<Uuid>,
    details: serde_json::Value,
) -> Result<AuditLogEntry> {
    let entry = AuditLogEntry::new(action, actor.id, target_type, target_id, details, Utc::now());

    match store.commit(mutations, entry.clone()).await {
        Ok(()) => Ok(entry),
        Err(StoreError::Unavailable(msg)) => {
            error!(
                action = %action,
                actor_id = %actor.id,
                target_id = %entry.target_id,
                error = %msg,
                "Audited write aborted"
            );
            Err(Error::StoreUnavailable(msg))
        }
        Err(err) => {
            warn!(
                action = %action,
                actor_id = %actor.id,
                target_id = %entry.target_id,
                error = %err,
                "Audited write rejected by store"
            );
            Err(err.into())
        }
    }
}
