use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};

use crate::common::{ArtefactId, Error, Result};
use crate::domains::artefacts::actions::{
    add_version, create_artefact, get_artefact, list_artefacts, transition_artefact,
    update_artefact,
};
use crate::domains::artefacts::data::{
    AddVersionInput, ArtefactDetail, ArtefactListParams, CreateArtefactInput, TransitionInput,
    UpdateArtefactInput,
};
use crate::domains::artefacts::machines::LifecycleEvent;
use crate::domains::artefacts::models::{Artefact, Version};
use crate::server::app::AppState;
use crate::server::extract::{OptionalJson, ValidatedJson};
use crate::server::middleware::CurrentUser;

fn parse_artefact_id(raw: &str) -> Result<ArtefactId> {
    ArtefactId::parse(raw).map_err(|_| Error::NotFound("artefact"))
}

pub async fn list_artefacts_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ArtefactListParams>,
) -> Result<Json<Vec<Artefact>>> {
    Ok(Json(list_artefacts(&state.deps, &user, params).await?))
}

pub async fn get_artefact_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ArtefactDetail>> {
    let id = parse_artefact_id(&id)?;
    Ok(Json(get_artefact(&state.deps, &user, id).await?))
}

pub async fn create_artefact_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateArtefactInput>,
) -> Result<(StatusCode, Json<ArtefactDetail>)> {
    let detail = create_artefact(&state.deps, &user, input).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn update_artefact_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateArtefactInput>,
) -> Result<Json<ArtefactDetail>> {
    let id = parse_artefact_id(&id)?;
    Ok(Json(update_artefact(&state.deps, &user, id, input).await?))
}

pub async fn add_version_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<AddVersionInput>,
) -> Result<(StatusCode, Json<Version>)> {
    let id = parse_artefact_id(&id)?;
    let version = add_version(&state.deps, &user, id, input).await?;
    Ok((StatusCode::CREATED, Json(version)))
}

/// `POST /artefacts/:id/transitions/:event` with an optional `{"comment"}` body
pub async fn transition_artefact_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, event)): Path<(String, String)>,
    OptionalJson(body): OptionalJson<TransitionInput>,
) -> Result<Json<ArtefactDetail>> {
    let id = parse_artefact_id(&id)?;
    let event: LifecycleEvent = event.parse()?;
    let comment = body.and_then(|input| input.comment);
    Ok(Json(
        transition_artefact(&state.deps, &user, id, event, comment).await?,
    ))
}
