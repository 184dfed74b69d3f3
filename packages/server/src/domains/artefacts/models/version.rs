use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{ArtefactId, UserId, VersionId};

/// An immutable revision of an artefact's content.
///
/// Sequence numbers start at 1 and increase by one per artefact. Edits always
/// create a new version; existing versions are never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: VersionId,
    pub artefact_id: ArtefactId,
    pub sequence: i32,
    /// Opaque handle into the blob store
    pub content_ref: String,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Version {
    pub fn new(
        artefact_id: ArtefactId,
        sequence: i32,
        content_ref: String,
        uploaded_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: VersionId::new(),
            artefact_id,
            sequence,
            content_ref,
            uploaded_by,
            created_at,
        }
    }
}
