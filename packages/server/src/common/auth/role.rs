use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::error::Error;

/// Fine-grained role stored on a user.
///
/// Only an admin may change a user's role after registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    JuniorConsultant,
    SeniorConsultant,
    KnowledgeChampion,
    GovernanceCouncilMember,
    SystemAdmin,
}

/// Coarse permission tier derived from a [`Role`].
///
/// Never stored and never accepted from a client: always recomputed with
/// [`Role::group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleGroup {
    Admin,
    Reviewer,
    Consultant,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::JuniorConsultant,
        Role::SeniorConsultant,
        Role::KnowledgeChampion,
        Role::GovernanceCouncilMember,
        Role::SystemAdmin,
    ];

    /// The single canonical role → roleGroup derivation.
    pub fn group(self) -> RoleGroup {
        match self {
            Role::SystemAdmin => RoleGroup::Admin,
            Role::GovernanceCouncilMember => RoleGroup::Reviewer,
            Role::KnowledgeChampion | Role::SeniorConsultant | Role::JuniorConsultant => {
                RoleGroup::Consultant
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::JuniorConsultant => "junior_consultant",
            Role::SeniorConsultant => "senior_consultant",
            Role::KnowledgeChampion => "knowledge_champion",
            Role::GovernanceCouncilMember => "governance_council_member",
            Role::SystemAdmin => "system_admin",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Role::JuniorConsultant => "Junior Consultant",
            Role::SeniorConsultant => "Senior Consultant",
            Role::KnowledgeChampion => "Knowledge Champion",
            Role::GovernanceCouncilMember => "Governance Council",
            Role::SystemAdmin => "System Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| Error::InvalidRole(s.to_string()))
    }
}

impl RoleGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleGroup::Admin => "admin",
            RoleGroup::Reviewer => "reviewer",
            RoleGroup::Consultant => "consultant",
        }
    }

    /// Admins and reviewers may look beyond their home region.
    pub fn is_privileged(self) -> bool {
        matches!(self, RoleGroup::Admin | RoleGroup::Reviewer)
    }
}

impl fmt::Display for RoleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
