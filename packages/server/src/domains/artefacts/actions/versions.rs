use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::common::auth::{Action, Actor, Resource};
use crate::common::{ArtefactId, Error, Result};
use crate::domains::artefacts::data::{validate_content_ref, AddVersionInput};
use crate::domains::artefacts::models::{ArtefactStatus, Version};
use crate::domains::audit::actions::record_with;
use crate::domains::audit::models::{AuditAction, TargetType};
use crate::domains::users::models::User;
use crate::kernel::{Mutation, ServerDeps};

use super::queries::load_visible;

/// Append the next version. The artefact's status is left untouched, even
/// when it is already approved.
pub async fn add_version(
    deps: &ServerDeps,
    actor: &User,
    id: ArtefactId,
    input: AddVersionInput,
) -> Result<Version> {
    let artefact = load_visible(deps, actor, id).await?;

    Actor::new(actor)
        .can(Action::Write)
        .on(Resource::Artefact(&artefact))
        .check()?;

    if artefact.status == ArtefactStatus::Archived {
        return Err(Error::Conflict(
            "Archived artefacts cannot receive new versions".to_string(),
        ));
    }

    let content_ref = validate_content_ref(&input.content_ref)?;
    let sequence = deps
        .store
        .list_versions(artefact.id)
        .await?
        .last()
        .map_or(1, |v| v.sequence + 1);

    let version = Version::new(artefact.id, sequence, content_ref, actor.id, Utc::now());

    record_with(
        deps.store.as_ref(),
        vec![Mutation::InsertVersion(version.clone())],
        AuditAction::VersionAdded,
        actor,
        TargetType::Version,
        version.id,
        json!({
            "artefactId": artefact.id,
            "sequence": version.sequence,
            "contentRef": version.content_ref,
        }),
    )
    .await?;

    info!(
        artefact_id = %artefact.id,
        version_id = %version.id,
        sequence = version.sequence,
        "Version added"
    );
    Ok(version)
}
