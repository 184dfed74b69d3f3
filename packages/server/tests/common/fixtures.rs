//! Test fixtures for creating test data.
//!
//! Artefacts are created through the actions layer so they carry the same
//! audit trail as production data.

use dkn_core::common::auth::Role;
use dkn_core::common::ArtefactId;
use dkn_core::domains::artefacts::actions::{create_artefact, transition_artefact};
use dkn_core::domains::artefacts::data::CreateArtefactInput;
use dkn_core::domains::artefacts::machines::LifecycleEvent;
use dkn_core::domains::artefacts::models::Artefact;
use dkn_core::domains::audit::data::AuditQuery;
use dkn_core::domains::audit::models::AuditLogEntry;
use dkn_core::domains::users::models::User;
use dkn_core::kernel::BaseStore;

use super::TestHarness;

/// The cast used by most scenarios
pub struct Cast {
    /// Consultant in North
    pub u1: User,
    /// Second consultant in North
    pub u2: User,
    /// Consultant in South
    pub u3: User,
    /// Reviewer in South
    pub reviewer: User,
    /// Admin in North
    pub admin: User,
}

pub async fn seed_cast(harness: &TestHarness) -> Cast {
    Cast {
        u1: harness
            .seed_user("Uma", Role::SeniorConsultant, harness.north)
            .await,
        u2: harness
            .seed_user("Uri", Role::JuniorConsultant, harness.north)
            .await,
        u3: harness
            .seed_user("Sol", Role::KnowledgeChampion, harness.south)
            .await,
        reviewer: harness
            .seed_user("Rae", Role::GovernanceCouncilMember, harness.south)
            .await,
        admin: harness
            .seed_user("Ada", Role::SystemAdmin, harness.north)
            .await,
    }
}

pub fn artefact_input(title: &str, classification: &str) -> CreateArtefactInput {
    CreateArtefactInput {
        title: title.to_string(),
        description: Some(format!("{} description", title)),
        tags: Some(vec!["playbook".to_string()]),
        classification: classification.to_string(),
        content_ref: None,
    }
}

/// Create a draft owned by `owner`
pub async fn create_test_artefact(
    harness: &TestHarness,
    owner: &User,
    title: &str,
    classification: &str,
) -> Artefact {
    create_artefact(&harness.deps, owner, artefact_input(title, classification))
        .await
        .expect("Failed to create test artefact")
        .artefact
}

/// Fire `events` in order as `actor`
pub async fn drive(
    harness: &TestHarness,
    actor: &User,
    id: ArtefactId,
    events: &[LifecycleEvent],
) {
    for event in events {
        transition_artefact(&harness.deps, actor, id, *event, None)
            .await
            .expect("Failed to drive test artefact");
    }
}

/// All audit entries targeting `target`, most recent first
pub async fn audit_for(harness: &TestHarness, target: ArtefactId) -> Vec<AuditLogEntry> {
    harness
        .store()
        .query_audit(&AuditQuery::for_target(target))
        .await
        .unwrap()
}
