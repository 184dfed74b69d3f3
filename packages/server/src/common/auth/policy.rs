//! The policy engine: a pure `(actor, action, resource) -> Decision` function.
//!
//! Rules are evaluated top to bottom and the first match wins:
//!
//! 1. `admin` is always allowed.
//! 2. `reviewer` reads any artefact, decides on artefacts awaiting review,
//!    archives approved work and reads the audit trail; it edits only its own
//!    artefacts.
//! 3. `consultant` reads and writes its own artefacts, reads `public`/`internal`
//!    work from its home region and `public` work from anywhere.
//! 4. Everything else is denied.

use crate::common::auth::{Action, DenyReason, Resource, RoleGroup};
use crate::domains::artefacts::machines::EdgeGuard;
use crate::domains::artefacts::models::{Artefact, ArtefactStatus, Classification};
use crate::domains::users::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `actor` may perform `action` on `resource`.
///
/// The role group is derived from the actor's stored role on every call.
pub fn authorize(actor: &User, action: Action, resource: Resource<'_>) -> Decision {
    match actor.role.group() {
        RoleGroup::Admin => Decision::Allow,
        RoleGroup::Reviewer => reviewer_rules(actor, action, resource),
        RoleGroup::Consultant => consultant_rules(actor, action, resource),
    }
}

fn reviewer_rules(actor: &User, action: Action, resource: Resource<'_>) -> Decision {
    match (action, resource) {
        (Action::Read, Resource::Artefact(_)) => Decision::Allow,
        (Action::Write, Resource::Artefact(artefact)) => owner_only(actor, artefact),
        (Action::Transition(event), Resource::Artefact(artefact)) => match event.guard() {
            EdgeGuard::Reviewer if artefact.status == ArtefactStatus::PendingReview => {
                Decision::Allow
            }
            EdgeGuard::Reviewer => Decision::Deny(DenyReason::NotReviewable),
            EdgeGuard::OwnerOrReviewer => Decision::Allow,
            EdgeGuard::Owner => owner_only(actor, artefact),
        },
        (Action::QueryAudit, Resource::AuditLog) => Decision::Allow,
        (Action::Read, Resource::User(_)) | (Action::Read, Resource::Regions) => Decision::Allow,
        (Action::ManageUsers, _) | (Action::ManageRegions, _) => {
            Decision::Deny(DenyReason::InsufficientRole)
        }
        _ => Decision::Deny(DenyReason::NotAuthorized),
    }
}

fn consultant_rules(actor: &User, action: Action, resource: Resource<'_>) -> Decision {
    match (action, resource) {
        (Action::Read, Resource::Artefact(artefact)) => consultant_read(actor, artefact),
        (Action::Write, Resource::Artefact(artefact)) => owner_only(actor, artefact),
        (Action::Transition(event), Resource::Artefact(artefact)) => match event.guard() {
            EdgeGuard::Reviewer => Decision::Deny(DenyReason::InsufficientRole),
            EdgeGuard::Owner | EdgeGuard::OwnerOrReviewer => owner_only(actor, artefact),
        },
        (Action::Read, Resource::User(user)) if user.id == actor.id => Decision::Allow,
        (Action::Read, Resource::Regions) => Decision::Allow,
        (Action::QueryAudit, _) | (Action::ManageUsers, _) | (Action::ManageRegions, _) => {
            Decision::Deny(DenyReason::InsufficientRole)
        }
        _ => Decision::Deny(DenyReason::NotAuthorized),
    }
}

fn consultant_read(actor: &User, artefact: &Artefact) -> Decision {
    if artefact.owner_id == actor.id {
        return Decision::Allow;
    }
    match artefact.classification {
        Classification::Public => Decision::Allow,
        Classification::Internal if artefact.region_id == actor.region_id => Decision::Allow,
        Classification::Internal => Decision::Deny(DenyReason::RegionRestricted),
        Classification::Confidential | Classification::Restricted => {
            Decision::Deny(DenyReason::ClassificationRestricted)
        }
    }
}

fn owner_only(actor: &User, artefact: &Artefact) -> Decision {
    if artefact.owner_id == actor.id {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::NotOwner)
    }
}
