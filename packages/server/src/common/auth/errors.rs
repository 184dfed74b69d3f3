use serde::Serialize;
use thiserror::Error;

/// Why the policy engine denied a request.
///
/// Surfaced to clients (for 403s) and logged; the engine itself never writes
/// to the audit log.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    #[error("not authorized")]
    NotAuthorized,

    #[error("role does not permit this action")]
    InsufficientRole,

    #[error("only the owner may do this")]
    NotOwner,

    #[error("classification restricts access")]
    ClassificationRestricted,

    #[error("artefact belongs to another region")]
    RegionRestricted,

    #[error("artefact is not in a reviewable state")]
    NotReviewable,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::NotAuthorized => "not_authorized",
            DenyReason::InsufficientRole => "insufficient_role",
            DenyReason::NotOwner => "not_owner",
            DenyReason::ClassificationRestricted => "classification_restricted",
            DenyReason::RegionRestricted => "region_restricted",
            DenyReason::NotReviewable => "not_reviewable",
        }
    }
}
