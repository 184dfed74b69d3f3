use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::common::auth::{Action, Actor, Resource};
use crate::common::{ArtefactId, Result};
use crate::domains::artefacts::data::{
    normalize_tags, validate_content_ref, validate_title, ArtefactDetail, CreateArtefactInput,
};
use crate::domains::artefacts::models::{Artefact, ArtefactStatus, Classification, Version};
use crate::domains::audit::actions::record_with;
use crate::domains::audit::models::{AuditAction, TargetType};
use crate::domains::users::models::User;
use crate::kernel::{Mutation, ServerDeps};

use super::queries::detail;

/// Create a draft owned by the caller in the caller's region.
///
/// An optional `contentRef` becomes version 1 in the same unit of work.
pub async fn create_artefact(
    deps: &ServerDeps,
    actor: &User,
    input: CreateArtefactInput,
) -> Result<ArtefactDetail> {
    let title = validate_title(&input.title)?;
    let classification: Classification = input.classification.trim().parse()?;
    let tags = normalize_tags(input.tags.unwrap_or_default())?;
    let content_ref = input
        .content_ref
        .as_deref()
        .map(validate_content_ref)
        .transpose()?;

    let now = Utc::now();
    let artefact = Artefact {
        id: ArtefactId::new(),
        title,
        description: input.description.unwrap_or_default().trim().to_string(),
        tags,
        classification,
        status: ArtefactStatus::Draft,
        owner_id: actor.id,
        region_id: actor.region_id,
        created_at: now,
        updated_at: now,
    };

    Actor::new(actor)
        .can(Action::Write)
        .on(Resource::Artefact(&artefact))
        .check()?;

    let first_version =
        content_ref.map(|content_ref| Version::new(artefact.id, 1, content_ref, actor.id, now));

    record_with(
        deps.store.as_ref(),
        vec![Mutation::InsertArtefact {
            artefact: artefact.clone(),
            first_version: first_version.clone(),
        }],
        AuditAction::ArtefactCreated,
        actor,
        TargetType::Artefact,
        artefact.id,
        json!({
            "title": artefact.title,
            "classification": artefact.classification,
            "regionId": artefact.region_id,
            "versionId": first_version.as_ref().map(|v| v.id),
        }),
    )
    .await?;

    info!(
        artefact_id = %artefact.id,
        owner_id = %actor.id,
        classification = %artefact.classification,
        "Artefact created"
    );
    detail(deps, actor, artefact).await
}
