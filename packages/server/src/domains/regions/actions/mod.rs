use serde_json::json;
use tracing::info;

use crate::common::auth::{Action, Actor, Resource};
use crate::common::Result;
use crate::domains::audit::actions::record_with;
use crate::domains::audit::models::{AuditAction, TargetType};
use crate::domains::regions::data::{validate_region_name, CreateRegionInput};
use crate::domains::regions::models::Region;
use crate::domains::users::models::User;
use crate::kernel::{Mutation, ServerDeps};

/// Reference data, ordered by name. Not policy-gated.
pub async fn list_regions(deps: &ServerDeps) -> Result<Vec<Region>> {
    Ok(deps.store.list_regions().await?)
}

/// Create a region (admin only). Writes `REGION_CREATED`.
pub async fn create_region(
    deps: &ServerDeps,
    actor: &User,
    input: CreateRegionInput,
) -> Result<Region> {
    Actor::new(actor)
        .can(Action::ManageRegions)
        .on(Resource::Regions)
        .check()?;

    let region = Region::new(validate_region_name(&input.region_name)?);

    record_with(
        deps.store.as_ref(),
        vec![Mutation::InsertRegion(region.clone())],
        AuditAction::RegionCreated,
        actor,
        TargetType::Region,
        region.id,
        json!({ "regionName": region.region_name }),
    )
    .await?;

    info!(region_id = %region.id, name = %region.region_name, "Region created");
    Ok(region)
}
