// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Policy and lifecycle rules live in common::auth and domains::*; a store only
// persists what it is told and enforces the compare-and-set guards below.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::common::{ArtefactId, RegionId, UserId};
use crate::domains::artefacts::data::ArtefactQuery;
use crate::domains::artefacts::models::{Artefact, ArtefactStatus, Version};
use crate::domains::audit::data::AuditQuery;
use crate::domains::audit::models::AuditLogEntry;
use crate::domains::regions::models::Region;
use crate::domains::users::models::User;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A guard did not hold (stale status, duplicate key, sequence taken)
    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::RowNotFound => StoreError::NotFound("row"),
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// One state change inside a unit of work.
#[derive(Debug, Clone)]
pub enum Mutation {
    InsertUser(User),

    /// Replace role and region of an existing user
    UpdateUser(User),

    InsertRegion(Region),

    InsertArtefact {
        artefact: Artefact,
        first_version: Option<Version>,
    },

    /// Replace title, description, tags and classification, provided the
    /// artefact is still in `expected_status`
    UpdateArtefact {
        artefact: Artefact,
        expected_status: ArtefactStatus,
    },

    /// Append a version; its sequence must be exactly one past the current
    /// highest sequence for the artefact
    InsertVersion(Version),

    /// Compare-and-set on the lifecycle status
    SetStatus {
        artefact_id: ArtefactId,
        expected: ArtefactStatus,
        next: ArtefactStatus,
        at: DateTime<Utc>,
    },
}

// =============================================================================
// Store Trait (Infrastructure - persistence for the core)
// =============================================================================

#[async_trait]
pub trait BaseStore: Send + Sync {
    /// Apply `mutations` and append `audit` as one atomic unit.
    ///
    /// Either every mutation and the audit entry become visible together, or
    /// nothing does. A failed guard yields `StoreError::Conflict`.
    async fn commit(&self, mutations: Vec<Mutation>, audit: AuditLogEntry)
        -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// `email` must already be normalized
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn list_regions(&self) -> Result<Vec<Region>, StoreError>;

    async fn find_region(&self, id: RegionId) -> Result<Option<Region>, StoreError>;

    async fn find_artefact(&self, id: ArtefactId) -> Result<Option<Artefact>, StoreError>;

    /// Versions ordered by ascending sequence
    async fn list_versions(&self, artefact_id: ArtefactId) -> Result<Vec<Version>, StoreError>;

    /// Artefacts matching `query`, newest first (ties broken by id, descending)
    async fn list_artefacts(&self, query: &ArtefactQuery) -> Result<Vec<Artefact>, StoreError>;

    /// Audit entries matching `query`, most recent first (ties broken by id, descending)
    async fn query_audit(&self, query: &AuditQuery) -> Result<Vec<AuditLogEntry>, StoreError>;
}
