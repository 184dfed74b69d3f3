use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::auth::{Role, RoleGroup};
use crate::common::{RegionId, UserId};
use crate::domains::users::models::User;

/// Public view of a user. `roleGroup` is always derived, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub role_group: RoleGroup,
    pub role_label: &'static str,
    pub region_id: RegionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            role_group: user.role_group(),
            role_label: user.role.label(),
            region_id: user.region_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Admin edit of a user's role and/or region.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub role: Option<String>,
    pub region_id: Option<String>,
}
