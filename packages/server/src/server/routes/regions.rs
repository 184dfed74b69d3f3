use axum::{extract::Extension, http::StatusCode, Json};

use crate::common::Result;
use crate::domains::regions::actions::{create_region, list_regions};
use crate::domains::regions::data::CreateRegionInput;
use crate::domains::regions::models::Region;
use crate::server::app::AppState;
use crate::server::extract::ValidatedJson;
use crate::server::middleware::CurrentUser;

/// Public: the signup form needs the region list before anyone has a token
pub async fn list_regions_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Region>>> {
    Ok(Json(list_regions(&state.deps).await?))
}

pub async fn create_region_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateRegionInput>,
) -> Result<(StatusCode, Json<Region>)> {
    let region = create_region(&state.deps, &user, input).await?;
    Ok((StatusCode::CREATED, Json(region)))
}
