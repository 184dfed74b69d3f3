use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::common::auth::{Action, Actor, Resource};
use crate::common::{ArtefactId, Error, Result};
use crate::domains::artefacts::data::ArtefactDetail;
use crate::domains::artefacts::machines::{edge_for, LifecycleEvent};
use crate::domains::audit::actions::record_with;
use crate::domains::audit::models::TargetType;
use crate::domains::users::models::User;
use crate::kernel::{Mutation, ServerDeps};

use super::queries::{detail, load_visible};

/// Drive an artefact along one lifecycle edge.
///
/// Order of checks: visibility (404), edge exists (409), policy for this
/// specific event (403). The status change is a compare-and-set committed
/// together with its audit entry; losing a race to a concurrent transition
/// yields `IllegalTransition` from the status the winner left behind.
pub async fn transition_artefact(
    deps: &ServerDeps,
    actor: &User,
    id: ArtefactId,
    event: LifecycleEvent,
    comment: Option<String>,
) -> Result<ArtefactDetail> {
    let artefact = load_visible(deps, actor, id).await?;

    let edge = edge_for(artefact.status, event).ok_or(Error::IllegalTransition {
        from: artefact.status,
        event,
    })?;

    Actor::new(actor)
        .can(Action::Transition(event))
        .on(Resource::Artefact(&artefact))
        .check()?;

    let at = Utc::now();
    let comment = comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let result = record_with(
        deps.store.as_ref(),
        vec![Mutation::SetStatus {
            artefact_id: artefact.id,
            expected: edge.from,
            next: edge.to,
            at,
        }],
        event.audit_action(),
        actor,
        TargetType::Artefact,
        artefact.id,
        json!({
            "event": event,
            "from": edge.from,
            "to": edge.to,
            "comment": comment,
        }),
    )
    .await;

    match result {
        Ok(_) => {}
        Err(Error::Conflict(_)) => {
            let current = deps
                .store
                .find_artefact(artefact.id)
                .await?
                .ok_or(Error::NotFound("artefact"))?;
            warn!(
                artefact_id = %artefact.id,
                event = %event,
                status = %current.status,
                "Stale transition lost a race"
            );
            return Err(Error::IllegalTransition {
                from: current.status,
                event,
            });
        }
        Err(e) => return Err(e),
    }

    info!(
        artefact_id = %artefact.id,
        actor_id = %actor.id,
        from = %edge.from,
        to = %edge.to,
        "Artefact transitioned"
    );

    let mut artefact = artefact;
    artefact.status = edge.to;
    artefact.updated_at = at;
    detail(deps, actor, artefact).await
}
