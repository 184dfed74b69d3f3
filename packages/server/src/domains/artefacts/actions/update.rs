use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::common::auth::{Action, Actor, Resource};
use crate::common::{ArtefactId, Error, Result};
use crate::domains::artefacts::data::{
    normalize_tags, validate_title, ArtefactDetail, UpdateArtefactInput,
};
use crate::domains::artefacts::models::{ArtefactStatus, Classification};
use crate::domains::audit::actions::record_with;
use crate::domains::audit::models::{AuditAction, TargetType};
use crate::domains::users::models::User;
use crate::kernel::{Mutation, ServerDeps};

use super::queries::{detail, load_visible};

/// Edit title, description, tags or classification.
///
/// Never touches `status` or `regionId`. Archived artefacts are frozen.
/// Writes `ARTEFACT_UPDATED` listing the changed fields; a no-op edit writes
/// nothing.
pub async fn update_artefact(
    deps: &ServerDeps,
    actor: &User,
    id: ArtefactId,
    input: UpdateArtefactInput,
) -> Result<ArtefactDetail> {
    let current = load_visible(deps, actor, id).await?;

    Actor::new(actor)
        .can(Action::Write)
        .on(Resource::Artefact(&current))
        .check()?;

    if current.status == ArtefactStatus::Archived {
        return Err(Error::Conflict(
            "Archived artefacts cannot be edited".to_string(),
        ));
    }

    let mut updated = current.clone();
    let mut changed: Vec<&'static str> = Vec::new();

    if let Some(title) = input.title {
        let title = validate_title(&title)?;
        if title != current.title {
            updated.title = title;
            changed.push("title");
        }
    }
    if let Some(description) = input.description {
        let description = description.trim().to_string();
        if description != current.description {
            updated.description = description;
            changed.push("description");
        }
    }
    if let Some(tags) = input.tags {
        let tags = normalize_tags(tags)?;
        if tags != current.tags {
            updated.tags = tags;
            changed.push("tags");
        }
    }
    if let Some(classification) = input.classification {
        let classification: Classification = classification.trim().parse()?;
        if classification != current.classification {
            updated.classification = classification;
            changed.push("classification");
        }
    }

    if changed.is_empty() {
        return detail(deps, actor, current).await;
    }

    updated.updated_at = Utc::now();
    record_with(
        deps.store.as_ref(),
        vec![Mutation::UpdateArtefact {
            artefact: updated.clone(),
            expected_status: current.status,
        }],
        AuditAction::ArtefactUpdated,
        actor,
        TargetType::Artefact,
        updated.id,
        json!({ "fields": changed }),
    )
    .await?;

    info!(artefact_id = %updated.id, actor_id = %actor.id, fields = ?changed, "Artefact updated");
    detail(deps, actor, updated).await
}
