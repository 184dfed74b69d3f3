use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::RegionId;

/// Organizational region. Reference data: never updated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: RegionId,
    pub region_name: String,
    pub created_at: DateTime<Utc>,
}

impl Region {
    pub fn new(region_name: impl Into<String>) -> Self {
        Self {
            id: RegionId::new(),
            region_name: region_name.into(),
            created_at: Utc::now(),
        }
    }
}
