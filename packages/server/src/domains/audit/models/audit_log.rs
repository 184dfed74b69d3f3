use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::common::{AuditLogId, Error, UserId};

/// Tag describing what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    ArtefactCreated,
    ArtefactUpdated,
    VersionAdded,
    SubmittedForReview,
    GovDecision,
    ArtefactRevised,
    ArtefactArchived,
    UserRegistered,
    UserUpdated,
    RegionCreated,
}

impl AuditAction {
    pub const ALL: [AuditAction; 10] = [
        AuditAction::ArtefactCreated,
        AuditAction::ArtefactUpdated,
        AuditAction::VersionAdded,
        AuditAction::SubmittedForReview,
        AuditAction::GovDecision,
        AuditAction::ArtefactRevised,
        AuditAction::ArtefactArchived,
        AuditAction::UserRegistered,
        AuditAction::UserUpdated,
        AuditAction::RegionCreated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::ArtefactCreated => "ARTEFACT_CREATED",
            AuditAction::ArtefactUpdated => "ARTEFACT_UPDATED",
            AuditAction::VersionAdded => "VERSION_ADDED",
            AuditAction::SubmittedForReview => "SUBMITTED_FOR_REVIEW",
            AuditAction::GovDecision => "GOV_DECISION",
            AuditAction::ArtefactRevised => "ARTEFACT_REVISED",
            AuditAction::ArtefactArchived => "ARTEFACT_ARCHIVED",
            AuditAction::UserRegistered => "USER_REGISTERED",
            AuditAction::UserUpdated => "USER_UPDATED",
            AuditAction::RegionCreated => "REGION_CREATED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::validation(format!("Invalid audit action: {}", s)))
    }
}

/// Kind of entity an audit entry points at (weak reference by id + tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    Artefact,
    Version,
    User,
    Region,
}

impl TargetType {
    pub const ALL: [TargetType; 4] = [
        TargetType::Artefact,
        TargetType::Version,
        TargetType::User,
        TargetType::Region,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::Artefact => "Artefact",
            TargetType::Version => "Version",
            TargetType::User => "User",
            TargetType::Region => "Region",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::validation(format!("Invalid target type: {}", s)))
    }
}

/// Immutable record of one policy-gated mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    pub action: AuditAction,
    pub actor_id: UserId,
    pub target_type: TargetType,
    pub target_id: Uuid,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(
        action: AuditAction,
        actor_id: UserId,
        target_type: TargetType,
        target_id: impl Into<Uuid>,
        details: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AuditLogId::new(),
            action,
            actor_id,
            target_type,
            target_id: target_id.into(),
            details,
            created_at,
        }
    }
}
