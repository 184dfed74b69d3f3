use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::common::{ArtefactId, Error, RegionId, UserId};

/// Lifecycle status. Changes only through a validated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtefactStatus {
    Draft,
    PendingReview,
    Approved,
    Rejected,
    Archived,
}

impl ArtefactStatus {
    pub const ALL: [ArtefactStatus; 5] = [
        ArtefactStatus::Draft,
        ArtefactStatus::PendingReview,
        ArtefactStatus::Approved,
        ArtefactStatus::Rejected,
        ArtefactStatus::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArtefactStatus::Draft => "draft",
            ArtefactStatus::PendingReview => "pending_review",
            ArtefactStatus::Approved => "approved",
            ArtefactStatus::Rejected => "rejected",
            ArtefactStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ArtefactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtefactStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtefactStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::validation(format!("Invalid artefact status: {}", s)))
    }
}

/// Sensitivity tier, ordered from least to most sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Public,
    Internal,
    Confidential,
    Restricted,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Public,
        Classification::Internal,
        Classification::Confidential,
        Classification::Restricted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Public => "public",
            Classification::Internal => "internal",
            Classification::Confidential => "confidential",
            Classification::Restricted => "restricted",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Classification::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::validation(format!("Invalid classification: {}", s)))
    }
}

/// A knowledge artefact.
///
/// `region_id` is fixed at creation; ownership never migrates region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artefact {
    pub id: ArtefactId,
    pub title: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub classification: Classification,
    pub status: ArtefactStatus,
    pub owner_id: UserId,
    pub region_id: RegionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Artefact {
    /// Case-insensitive substring match over title, description and tags.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
    }
}
