//! In-process store behind a single `RwLock`.
//!
//! A unit of work applies its changes in place while holding the write lock,
//! recording an inverse for each one. If any guard fails the inverses are
//! replayed before the lock is released, so readers (which take the read
//! lock) never observe half of a commit.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{BaseStore, Mutation, StoreError};
use crate::common::{ArtefactId, RegionId, UserId};
use crate::domains::artefacts::data::ArtefactQuery;
use crate::domains::artefacts::models::{Artefact, Version};
use crate::domains::audit::data::AuditQuery;
use crate::domains::audit::models::AuditLogEntry;
use crate::domains::regions::models::Region;
use crate::domains::users::models::User;

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    regions: HashMap<RegionId, Region>,
    artefacts: HashMap<ArtefactId, Artefact>,
    versions: HashMap<ArtefactId, Vec<Version>>,
    audit: Vec<AuditLogEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `commit` and `ping` fail with `StoreError::Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert reference data without an audit entry (bootstrap only).
    pub async fn seed_region(&self, region: Region) {
        self.state.write().await.regions.insert(region.id, region);
    }

    /// Insert a user without an audit entry (bootstrap only).
    pub async fn seed_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Total number of audit entries, regardless of policy.
    pub async fn audit_len(&self) -> usize {
        self.state.read().await.audit.len()
    }
}

/// Inverse of one applied mutation, used to roll back a failed unit of work.
enum Undo {
    RemoveUser(UserId),
    RestoreUser(User),
    RemoveRegion(RegionId),
    RemoveArtefact(ArtefactId),
    RestoreArtefact(Artefact),
    PopVersion(ArtefactId),
}

impl State {
    /// Apply one mutation in place. On error nothing has been changed.
    fn apply(&mut self, mutation: Mutation, undo: &mut Vec<Undo>) -> Result<(), StoreError> {
        match mutation {
            Mutation::InsertUser(user) => {
                if self.users.values().any(|u| u.email == user.email) {
                    return Err(StoreError::Conflict("email already registered".into()));
                }
                if !self.regions.contains_key(&user.region_id) {
                    return Err(StoreError::Conflict("unknown region".into()));
                }
                undo.push(Undo::RemoveUser(user.id));
                self.users.insert(user.id, user);
            }
            Mutation::UpdateUser(user) => {
                if !self.regions.contains_key(&user.region_id) {
                    return Err(StoreError::Conflict("unknown region".into()));
                }
                let existing = self
                    .users
                    .get_mut(&user.id)
                    .ok_or(StoreError::NotFound("user"))?;
                undo.push(Undo::RestoreUser(existing.clone()));
                existing.role = user.role;
                existing.region_id = user.region_id;
                existing.updated_at = user.updated_at;
            }
            Mutation::InsertRegion(region) => {
                if self
                    .regions
                    .values()
                    .any(|r| r.region_name.eq_ignore_ascii_case(&region.region_name))
                {
                    return Err(StoreError::Conflict("region name already exists".into()));
                }
                undo.push(Undo::RemoveRegion(region.id));
                self.regions.insert(region.id, region);
            }
            Mutation::InsertArtefact {
                artefact,
                first_version,
            } => {
                if self.artefacts.contains_key(&artefact.id) {
                    return Err(StoreError::Conflict("artefact already exists".into()));
                }
                let mut versions = Vec::new();
                if let Some(version) = first_version {
                    if version.sequence != 1 || version.artefact_id != artefact.id {
                        return Err(StoreError::Conflict("first version must be 1".into()));
                    }
                    versions.push(version);
                }
                undo.push(Undo::RemoveArtefact(artefact.id));
                self.versions.insert(artefact.id, versions);
                self.artefacts.insert(artefact.id, artefact);
            }
            Mutation::UpdateArtefact {
                artefact,
                expected_status,
            } => {
                let existing = self
                    .artefacts
                    .get_mut(&artefact.id)
                    .ok_or(StoreError::NotFound("artefact"))?;
                if existing.status != expected_status {
                    return Err(StoreError::Conflict("artefact status changed".into()));
                }
                undo.push(Undo::RestoreArtefact(existing.clone()));
                existing.title = artefact.title;
                existing.description = artefact.description;
                existing.tags = artefact.tags;
                existing.classification = artefact.classification;
                existing.updated_at = artefact.updated_at;
            }
            Mutation::InsertVersion(version) => {
                let artefact = self
                    .artefacts
                    .get_mut(&version.artefact_id)
                    .ok_or(StoreError::NotFound("artefact"))?;
                let versions = self.versions.entry(version.artefact_id).or_default();
                let next = versions.last().map_or(1, |v| v.sequence + 1);
                if version.sequence != next {
                    return Err(StoreError::Conflict(format!(
                        "version {} already exists",
                        version.sequence
                    )));
                }
                undo.push(Undo::RestoreArtefact(artefact.clone()));
                undo.push(Undo::PopVersion(version.artefact_id));
                artefact.updated_at = version.created_at;
                versions.push(version);
            }
            Mutation::SetStatus {
                artefact_id,
                expected,
                next,
                at,
            } => {
                let artefact = self
                    .artefacts
                    .get_mut(&artefact_id)
                    .ok_or(StoreError::NotFound("artefact"))?;
                if artefact.status != expected {
                    return Err(StoreError::Conflict(format!(
                        "status is {}, expected {}",
                        artefact.status, expected
                    )));
                }
                undo.push(Undo::RestoreArtefact(artefact.clone()));
                artefact.status = next;
                artefact.updated_at = at;
            }
        }
        Ok(())
    }

    fn rollback(&mut self, undo: Vec<Undo>) {
        for step in undo.into_iter().rev() {
            match step {
                Undo::RemoveUser(id) => {
                    self.users.remove(&id);
                }
                Undo::RestoreUser(user) => {
                    self.users.insert(user.id, user);
                }
                Undo::RemoveRegion(id) => {
                    self.regions.remove(&id);
                }
                Undo::RemoveArtefact(id) => {
                    self.artefacts.remove(&id);
                    self.versions.remove(&id);
                }
                Undo::RestoreArtefact(artefact) => {
                    self.artefacts.insert(artefact.id, artefact);
                }
                Undo::PopVersion(id) => {
                    if let Some(versions) = self.versions.get_mut(&id) {
                        versions.pop();
                    }
                }
            }
        }
    }
}

#[async_trait]
impl BaseStore for MemoryStore {
    async fn commit(
        &self,
        mutations: Vec<Mutation>,
        audit: AuditLogEntry,
    ) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store writes disabled".into()));
        }

        let mut state = self.state.write().await;
        let mut undo = Vec::new();
        let mut outcome = Ok(());
        for mutation in mutations {
            outcome = state.apply(mutation, &mut undo);
            if outcome.is_err() {
                break;
            }
        }
        if outcome.is_ok() && !state.users.contains_key(&audit.actor_id) {
            outcome = Err(StoreError::Conflict("unknown audit actor".into()));
        }

        match outcome {
            Ok(()) => {
                state.audit.push(audit);
                Ok(())
            }
            Err(err) => {
                state.rollback(undo);
                Err(err)
            }
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store writes disabled".into()));
        }
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_regions(&self) -> Result<Vec<Region>, StoreError> {
        let mut regions: Vec<Region> = self.state.read().await.regions.values().cloned().collect();
        regions.sort_by(|a, b| a.region_name.cmp(&b.region_name));
        Ok(regions)
    }

    async fn find_region(&self, id: RegionId) -> Result<Option<Region>, StoreError> {
        Ok(self.state.read().await.regions.get(&id).cloned())
    }

    async fn find_artefact(&self, id: ArtefactId) -> Result<Option<Artefact>, StoreError> {
        Ok(self.state.read().await.artefacts.get(&id).cloned())
    }

    async fn list_versions(&self, artefact_id: ArtefactId) -> Result<Vec<Version>, StoreError> {
        let state = self.state.read().await;
        Ok(state.versions.get(&artefact_id).cloned().unwrap_or_default())
    }

    async fn list_artefacts(&self, query: &ArtefactQuery) -> Result<Vec<Artefact>, StoreError> {
        let state = self.state.read().await;
        let mut artefacts: Vec<Artefact> = state
            .artefacts
            .values()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        artefacts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(artefacts)
    }

    async fn query_audit(&self, query: &AuditQuery) -> Result<Vec<AuditLogEntry>, StoreError> {
        let state = self.state.read().await;
        let mut entries: Vec<AuditLogEntry> = state
            .audit
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::auth::Role;
    use crate::domains::artefacts::models::{ArtefactStatus, Classification};
    use crate::domains::audit::models::{AuditAction, TargetType};
    use chrono::Utc;

    async fn seeded() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let region = Region::new("North");
        let user = User {
            id: UserId::new(),
            name: "Owner".to_string(),
            email: "owner@example.com".to_string(),
            role: Role::SeniorConsultant,
            region_id: region.id,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        store.seed_region(region).await;
        store.seed_user(user.clone()).await;
        (store, user)
    }

    fn draft(owner: &User) -> Artefact {
        Artefact {
            id: ArtefactId::new(),
            title: "Playbook".to_string(),
            description: String::new(),
            tags: Default::default(),
            classification: Classification::Internal,
            status: ArtefactStatus::Draft,
            owner_id: owner.id,
            region_id: owner.region_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(actor: &User, target: ArtefactId) -> AuditLogEntry {
        AuditLogEntry::new(
            AuditAction::ArtefactCreated,
            actor.id,
            TargetType::Artefact,
            target,
            serde_json::json!({}),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn stale_status_aborts_the_whole_unit() {
        let (store, user) = seeded().await;
        let artefact = draft(&user);
        store
            .commit(
                vec![Mutation::InsertArtefact {
                    artefact: artefact.clone(),
                    first_version: None,
                }],
                entry(&user, artefact.id),
            )
            .await
            .unwrap();

        let result = store
            .commit(
                vec![Mutation::SetStatus {
                    artefact_id: artefact.id,
                    expected: ArtefactStatus::PendingReview,
                    next: ArtefactStatus::Approved,
                    at: Utc::now(),
                }],
                entry(&user, artefact.id),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.audit_len().await, 1);
        assert_eq!(
            store.find_artefact(artefact.id).await.unwrap().unwrap().status,
            ArtefactStatus::Draft
        );
    }

    #[tokio::test]
    async fn failed_writes_leave_no_trace() {
        let (store, user) = seeded().await;
        store.set_fail_writes(true);
        let artefact = draft(&user);
        let result = store
            .commit(
                vec![Mutation::InsertArtefact {
                    artefact: artefact.clone(),
                    first_version: None,
                }],
                entry(&user, artefact.id),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store.find_artefact(artefact.id).await.unwrap().is_none());
        assert_eq!(store.audit_len().await, 0);
    }

    #[tokio::test]
    async fn version_sequence_must_be_contiguous() {
        let (store, user) = seeded().await;
        let artefact = draft(&user);
        store
            .commit(
                vec![Mutation::InsertArtefact {
                    artefact: artefact.clone(),
                    first_version: None,
                }],
                entry(&user, artefact.id),
            )
            .await
            .unwrap();

        let v2 = Version::new(artefact.id, 2, "blob://b".into(), user.id, Utc::now());
        let result = store
            .commit(vec![Mutation::InsertVersion(v2)], entry(&user, artefact.id))
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        let v1 = Version::new(artefact.id, 1, "blob://a".into(), user.id, Utc::now());
        store
            .commit(vec![Mutation::InsertVersion(v1)], entry(&user, artefact.id))
            .await
            .unwrap();
        assert_eq!(store.list_versions(artefact.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_guard_undoes_earlier_mutations_in_the_unit() {
        let (store, user) = seeded().await;
        let artefact = draft(&user);
        store
            .commit(
                vec![Mutation::InsertArtefact {
                    artefact: artefact.clone(),
                    first_version: None,
                }],
                entry(&user, artefact.id),
            )
            .await
            .unwrap();

        let v1 = Version::new(artefact.id, 1, "blob://a".into(), user.id, Utc::now());
        let region = Region::new("East");
        let result = store
            .commit(
                vec![
                    Mutation::InsertRegion(region.clone()),
                    Mutation::InsertVersion(v1),
                    Mutation::SetStatus {
                        artefact_id: artefact.id,
                        expected: ArtefactStatus::Approved,
                        next: ArtefactStatus::Archived,
                        at: Utc::now(),
                    },
                ],
                entry(&user, artefact.id),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert!(store.list_versions(artefact.id).await.unwrap().is_empty());
        assert!(store.find_region(region.id).await.unwrap().is_none());
        assert_eq!(store.find_artefact(artefact.id).await.unwrap(), Some(artefact));
        assert_eq!(store.audit_len().await, 1);
    }
}
