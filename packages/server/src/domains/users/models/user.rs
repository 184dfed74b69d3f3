use chrono::{DateTime, Utc};

use crate::common::auth::{Role, RoleGroup};
use crate::common::{RegionId, UserId};

/// A registered user.
///
/// `role` is the only stored permission attribute; the role group is derived
/// from it on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub region_id: RegionId,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role_group(&self) -> RoleGroup {
        self.role.group()
    }
}

/// Emails are compared case-insensitively and stored trimmed + lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
