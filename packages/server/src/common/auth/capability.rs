use crate::domains::artefacts::machines::LifecycleEvent;
use crate::domains::artefacts::models::Artefact;
use crate::domains::users::models::User;

/// Something an actor wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// View an artefact, a user profile or reference data
    Read,

    /// Edit artefact metadata or upload a new version
    Write,

    /// Drive an artefact along a lifecycle edge
    Transition(LifecycleEvent),

    /// Search the audit trail
    QueryAudit,

    /// Change another user's role or region
    ManageUsers,

    /// Create regions
    ManageRegions,
}

/// What the action is applied to.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Artefact(&'a Artefact),
    User(&'a User),
    AuditLog,
    Regions,
}

impl Action {
    pub fn name(&self) -> String {
        match self {
            Action::Read => "read".to_string(),
            Action::Write => "write".to_string(),
            Action::Transition(event) => event.to_string(),
            Action::QueryAudit => "query_audit".to_string(),
            Action::ManageUsers => "manage_users".to_string(),
            Action::ManageRegions => "manage_regions".to_string(),
        }
    }
}

impl Resource<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Artefact(_) => "artefact",
            Resource::User(_) => "user",
            Resource::AuditLog => "audit_log",
            Resource::Regions => "regions",
        }
    }
}
