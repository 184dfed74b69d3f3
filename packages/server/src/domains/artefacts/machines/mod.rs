//! Artefact lifecycle state machine - pure decision logic.
//!
//! ```text
//! draft ──submit_for_review──▶ pending_review ──approve──▶ approved ──archive──▶ archived
//!   ▲                               │
//!   └────────revise──── rejected ◀──┘ reject
//! ```
//!
//! Only the edges in [`EDGES`] exist. Who may take an edge is expressed as an
//! [`EdgeGuard`] and enforced by the policy engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::Error;
use crate::domains::artefacts::models::ArtefactStatus;
use crate::domains::audit::models::AuditAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    SubmitForReview,
    Approve,
    Reject,
    Revise,
    Archive,
}

/// Which actors an edge is reserved for (admins pass every guard).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeGuard {
    Owner,
    Reviewer,
    OwnerOrReviewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: ArtefactStatus,
    pub event: LifecycleEvent,
    pub to: ArtefactStatus,
}

pub const EDGES: [Edge; 5] = [
    Edge {
        from: ArtefactStatus::Draft,
        event: LifecycleEvent::SubmitForReview,
        to: ArtefactStatus::PendingReview,
    },
    Edge {
        from: ArtefactStatus::PendingReview,
        event: LifecycleEvent::Approve,
        to: ArtefactStatus::Approved,
    },
    Edge {
        from: ArtefactStatus::PendingReview,
        event: LifecycleEvent::Reject,
        to: ArtefactStatus::Rejected,
    },
    Edge {
        from: ArtefactStatus::Rejected,
        event: LifecycleEvent::Revise,
        to: ArtefactStatus::Draft,
    },
    Edge {
        from: ArtefactStatus::Approved,
        event: LifecycleEvent::Archive,
        to: ArtefactStatus::Archived,
    },
];

/// The edge leaving `from` on `event`, if any.
pub fn edge_for(from: ArtefactStatus, event: LifecycleEvent) -> Option<Edge> {
    EDGES
        .into_iter()
        .find(|edge| edge.from == from && edge.event == event)
}

/// Events that have an edge out of `status`.
pub fn available_events(status: ArtefactStatus) -> Vec<LifecycleEvent> {
    EDGES
        .into_iter()
        .filter(|edge| edge.from == status)
        .map(|edge| edge.event)
        .collect()
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 5] = [
        LifecycleEvent::SubmitForReview,
        LifecycleEvent::Approve,
        LifecycleEvent::Reject,
        LifecycleEvent::Revise,
        LifecycleEvent::Archive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::SubmitForReview => "submit_for_review",
            LifecycleEvent::Approve => "approve",
            LifecycleEvent::Reject => "reject",
            LifecycleEvent::Revise => "revise",
            LifecycleEvent::Archive => "archive",
        }
    }

    pub fn guard(self) -> EdgeGuard {
        match self {
            LifecycleEvent::SubmitForReview | LifecycleEvent::Revise => EdgeGuard::Owner,
            LifecycleEvent::Approve | LifecycleEvent::Reject => EdgeGuard::Reviewer,
            LifecycleEvent::Archive => EdgeGuard::OwnerOrReviewer,
        }
    }

    /// Audit tag written when this event is applied.
    pub fn audit_action(self) -> AuditAction {
        match self {
            LifecycleEvent::SubmitForReview => AuditAction::SubmittedForReview,
            LifecycleEvent::Approve | LifecycleEvent::Reject => AuditAction::GovDecision,
            LifecycleEvent::Revise => AuditAction::ArtefactRevised,
            LifecycleEvent::Archive => AuditAction::ArtefactArchived,
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| Error::validation(format!("Unknown lifecycle event: {}", s)))
    }
}
