use tracing::debug;

use crate::common::auth::{Action, Actor, Resource, RoleGroup};
use crate::common::{ArtefactId, Error, Result};
use crate::domains::artefacts::data::{
    ArtefactDetail, ArtefactListParams, ArtefactQuery, RegionScope,
};
use crate::domains::artefacts::machines::available_events;
use crate::domains::artefacts::models::Artefact;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Load an artefact the actor may read. Unreadable and missing artefacts are
/// both reported as not found.
pub(super) async fn load_visible(
    deps: &ServerDeps,
    actor: &User,
    id: ArtefactId,
) -> Result<Artefact> {
    let artefact = deps
        .store
        .find_artefact(id)
        .await?
        .ok_or(Error::NotFound("artefact"))?;

    Actor::new(actor)
        .can(Action::Read)
        .on(Resource::Artefact(&artefact))
        .check_visible("artefact")?;

    Ok(artefact)
}

/// Attach version history and the events this actor could fire next.
pub(super) async fn detail(
    deps: &ServerDeps,
    actor: &User,
    artefact: Artefact,
) -> Result<ArtefactDetail> {
    let versions = deps.store.list_versions(artefact.id).await?;
    let available_events = available_events(artefact.status)
        .into_iter()
        .filter(|event| {
            Actor::new(actor)
                .can(Action::Transition(*event))
                .on(Resource::Artefact(&artefact))
                .decide()
                .is_allowed()
        })
        .collect();

    Ok(ArtefactDetail {
        artefact,
        versions,
        available_events,
    })
}

pub async fn get_artefact(
    deps: &ServerDeps,
    actor: &User,
    id: ArtefactId,
) -> Result<ArtefactDetail> {
    let artefact = load_visible(deps, actor, id).await?;
    detail(deps, actor, artefact).await
}

/// Filtered library view, newest first.
///
/// Consultant listings cover the home region plus the consultant's own work
/// wherever it lives. A `regionId` other than the home region is dropped
/// rather than rejected. Every candidate is then passed through the same read
/// rule used for single-artefact access.
pub async fn list_artefacts(
    deps: &ServerDeps,
    actor: &User,
    params: ArtefactListParams,
) -> Result<Vec<Artefact>> {
    let mut query = ArtefactQuery::from_params(params)?;

    if actor.role_group() == RoleGroup::Consultant && query.region_id != Some(actor.region_id) {
        if query.region_id.is_some() {
            debug!(
                actor_id = %actor.id,
                requested = ?query.region_id,
                "Constraining consultant listing to home region"
            );
        }
        query.region_id = None;
        query.scope = Some(RegionScope {
            region_id: actor.region_id,
            owner_id: actor.id,
        });
    }

    let candidates = deps.store.list_artefacts(&query).await?;
    let visible: Vec<Artefact> = candidates
        .into_iter()
        .filter(|artefact| {
            Actor::new(actor)
                .can(Action::Read)
                .on(Resource::Artefact(artefact))
                .decide()
                .is_allowed()
        })
        .collect();

    debug!(actor_id = %actor.id, count = visible.len(), "Listed artefacts");
    Ok(visible)
}
