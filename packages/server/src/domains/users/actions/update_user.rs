use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::common::auth::{Action, Actor, Resource, Role};
use crate::common::{Error, RegionId, Result, UserId};
use crate::domains::audit::actions::record_with;
use crate::domains::audit::models::{AuditAction, TargetType};
use crate::domains::users::data::UpdateUserInput;
use crate::domains::users::models::User;
use crate::kernel::{Mutation, ServerDeps};

/// Change a user's role and/or region (admin only).
///
/// Writes `USER_UPDATED` with the old and new value of every changed field.
/// A no-op edit writes nothing.
pub async fn update_user(
    deps: &ServerDeps,
    actor: &User,
    id: UserId,
    input: UpdateUserInput,
) -> Result<User> {
    let current = deps
        .store
        .find_user(id)
        .await?
        .ok_or(Error::NotFound("user"))?;

    Actor::new(actor)
        .can(Action::ManageUsers)
        .on(Resource::User(&current))
        .check()?;

    let mut updated = current.clone();
    let mut changes = serde_json::Map::new();

    if let Some(role) = input.role {
        let role: Role = role.trim().parse()?;
        if role != current.role {
            changes.insert(
                "role".to_string(),
                json!({ "old": current.role, "new": role }),
            );
            updated.role = role;
        }
    }

    if let Some(region_id) = input.region_id {
        let region_id =
            RegionId::parse(&region_id).map_err(|_| Error::validation("Invalid regionId"))?;
        if deps.store.find_region(region_id).await?.is_none() {
            return Err(Error::validation("Unknown region"));
        }
        if region_id != current.region_id {
            changes.insert(
                "regionId".to_string(),
                json!({ "old": current.region_id, "new": region_id }),
            );
            updated.region_id = region_id;
        }
    }

    if changes.is_empty() {
        return Ok(current);
    }

    updated.updated_at = Utc::now();
    record_with(
        deps.store.as_ref(),
        vec![Mutation::UpdateUser(updated.clone())],
        AuditAction::UserUpdated,
        actor,
        TargetType::User,
        updated.id,
        json!({ "changes": changes }),
    )
    .await?;

    info!(
        user_id = %updated.id,
        actor_id = %actor.id,
        role = %updated.role,
        "User updated"
    );
    Ok(updated)
}
