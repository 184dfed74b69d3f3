//! Typed ID definitions for all domain entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities.
pub struct User;

/// Marker type for Region entities (reference data).
pub struct Region;

/// Marker type for Artefact entities.
pub struct Artefact;

/// Marker type for Version entities (immutable artefact revisions).
pub struct Version;

/// Marker type for AuditLogEntry entities.
pub struct AuditLogEntry;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Id<User>;

pub type RegionId = Id<Region>;

pub type ArtefactId = Id<Artefact>;

pub type VersionId = Id<Version>;

pub type AuditLogId = Id<AuditLogEntry>;
