//! PostgresStore adapter tests.
//!
//! These need Docker. Run with: cargo test --test postgres_store_tests -- --ignored

mod common;

use chrono::{Duration, Utc};
use dkn_core::common::auth::password::hash_password;
use dkn_core::common::auth::Role;
use dkn_core::common::{ArtefactId, RegionId, UserId};
use dkn_core::domains::artefacts::data::{ArtefactQuery, RegionScope};
use dkn_core::domains::artefacts::models::{Artefact, ArtefactStatus, Classification, Version};
use dkn_core::domains::audit::data::AuditQuery;
use dkn_core::domains::audit::models::{AuditAction, AuditLogEntry, TargetType};
use dkn_core::domains::regions::models::Region;
use dkn_core::domains::users::models::User;
use dkn_core::kernel::{BaseStore, Mutation, PostgresStore, StoreError};
use serde_json::json;
use uuid::Uuid;

use crate::common::postgres::{postgres_pool, postgres_store};

/// A region and a consultant unique to one test, so tests can share a database.
async fn seed_owner(store: &PostgresStore) -> (Region, User) {
    let region = store
        .seed_region(&format!("Region {}", Uuid::new_v4()))
        .await
        .unwrap()
        .expect("fresh region name");

    let now = Utc::now();
    let user = User {
        id: UserId::new(),
        name: "Uma".to_string(),
        email: format!("uma.{}@dkn.example", Uuid::new_v4()),
        role: Role::SeniorConsultant,
        region_id: region.id,
        password_hash: hash_password("correct horse battery").unwrap(),
        created_at: now,
        updated_at: now,
    };
    store
        .commit(
            vec![Mutation::InsertUser(user.clone())],
            audit(AuditAction::UserRegistered, &user, TargetType::User, user.id),
        )
        .await
        .unwrap();

    (region, user)
}

fn audit(action: AuditAction, actor: &User, target_type: TargetType, target: impl Into<Uuid>) -> AuditLogEntry {
    AuditLogEntry::new(action, actor.id, target_type, target, json!({}), Utc::now())
}

fn draft(owner: &User, title: &str, tags: &[&str], at: chrono::DateTime<Utc>) -> Artefact {
    Artefact {
        id: ArtefactId::new(),
        title: title.to_string(),
        description: format!("{} description", title),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        classification: Classification::Internal,
        status: ArtefactStatus::Draft,
        owner_id: owner.id,
        region_id: owner.region_id,
        created_at: at,
        updated_at: at,
    }
}

async fn insert(store: &PostgresStore, owner: &User, artefact: &Artefact) {
    store
        .commit(
            vec![Mutation::InsertArtefact {
                artefact: artefact.clone(),
                first_version: None,
            }],
            audit(
                AuditAction::ArtefactCreated,
                owner,
                TargetType::Artefact,
                artefact.id,
            ),
        )
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn committed_rows_round_trip() {
    let store = postgres_store().await;
    let (region, owner) = seed_owner(&store).await;
    let artefact = draft(&owner, "Playbook", &["delivery", "risk"], Utc::now());
    insert(&store, &owner, &artefact).await;

    let loaded = store.find_artefact(artefact.id).await.unwrap().unwrap();
    assert_eq!(loaded.title, "Playbook");
    assert_eq!(loaded.tags, artefact.tags);
    assert_eq!(loaded.region_id, region.id);

    let user = store
        .find_user_by_email(&owner.email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role, Role::SeniorConsultant);

    assert!(store.find_artefact(ArtefactId::new()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn failed_guard_rolls_back_the_whole_unit() {
    let store = postgres_store().await;
    let (_, owner) = seed_owner(&store).await;
    let artefact = draft(&owner, "Guarded", &[], Utc::now());
    insert(&store, &owner, &artefact).await;

    let version = Version::new(
        artefact.id,
        1,
        "blob://v1".to_string(),
        owner.id,
        Utc::now(),
    );
    let result = store
        .commit(
            vec![
                Mutation::InsertVersion(version.clone()),
                Mutation::SetStatus {
                    artefact_id: artefact.id,
                    expected: ArtefactStatus::Approved,
                    next: ArtefactStatus::Archived,
                    at: Utc::now(),
                },
            ],
            audit(
                AuditAction::ArtefactArchived,
                &owner,
                TargetType::Artefact,
                artefact.id,
            ),
        )
        .await;

    assert!(matches!(result, Err(StoreError::Conflict(_))));
    assert!(store.list_versions(artefact.id).await.unwrap().is_empty());
    let trail = store
        .query_audit(&AuditQuery::for_target(artefact.id))
        .await
        .unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, AuditAction::ArtefactCreated);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn status_is_compare_and_set() {
    let store = postgres_store().await;
    let (_, owner) = seed_owner(&store).await;
    let artefact = draft(&owner, "Contended", &[], Utc::now());
    insert(&store, &owner, &artefact).await;

    let submit = || Mutation::SetStatus {
        artefact_id: artefact.id,
        expected: ArtefactStatus::Draft,
        next: ArtefactStatus::PendingReview,
        at: Utc::now(),
    };
    let entry = || {
        audit(
            AuditAction::SubmittedForReview,
            &owner,
            TargetType::Artefact,
            artefact.id,
        )
    };

    store.commit(vec![submit()], entry()).await.unwrap();
    let second = store.commit(vec![submit()], entry()).await;
    assert!(matches!(second, Err(StoreError::Conflict(_))));

    let missing = store
        .commit(
            vec![Mutation::SetStatus {
                artefact_id: ArtefactId::new(),
                expected: ArtefactStatus::Draft,
                next: ArtefactStatus::PendingReview,
                at: Utc::now(),
            }],
            entry(),
        )
        .await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));

    let loaded = store.find_artefact(artefact.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, ArtefactStatus::PendingReview);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn version_sequence_must_be_next() {
    let store = postgres_store().await;
    let (_, owner) = seed_owner(&store).await;
    let artefact = draft(&owner, "Versioned", &[], Utc::now());
    insert(&store, &owner, &artefact).await;

    for sequence in [1, 2] {
        let version = Version::new(
            artefact.id,
            sequence,
            format!("blob://v{}", sequence),
            owner.id,
            Utc::now(),
        );
        store
            .commit(
                vec![Mutation::InsertVersion(version.clone())],
                audit(AuditAction::VersionAdded, &owner, TargetType::Version, version.id),
            )
            .await
            .unwrap();
    }

    let stale = Version::new(artefact.id, 2, "blob://dup".to_string(), owner.id, Utc::now());
    let result = store
        .commit(
            vec![Mutation::InsertVersion(stale.clone())],
            audit(AuditAction::VersionAdded, &owner, TargetType::Version, stale.id),
        )
        .await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));

    let sequences: Vec<i32> = store
        .list_versions(artefact.id)
        .await
        .unwrap()
        .iter()
        .map(|v| v.sequence)
        .collect();
    assert_eq!(sequences, vec![1, 2]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn search_and_ordering() {
    let store = postgres_store().await;
    let (region, owner) = seed_owner(&store).await;
    let base = Utc::now();
    let older = draft(&owner, "Risk Register", &["finance"], base - Duration::minutes(2));
    let newer = draft(&owner, "Kickoff 100%_done", &["delivery"], base - Duration::minutes(1));
    insert(&store, &owner, &older).await;
    insert(&store, &owner, &newer).await;

    let in_region = |search: Option<&str>| ArtefactQuery {
        search: search.map(str::to_string),
        region_id: Some(region.id),
        ..Default::default()
    };

    let all = store.list_artefacts(&in_region(None)).await.unwrap();
    let ids: Vec<ArtefactId> = all.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    let by_tag = store.list_artefacts(&in_region(Some("FIN"))).await.unwrap();
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].id, older.id);

    // Wildcards in the term are literal
    let literal = store.list_artefacts(&in_region(Some("100%_"))).await.unwrap();
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].id, newer.id);
    let wildcard = store.list_artefacts(&in_region(Some("%"))).await.unwrap();
    assert_eq!(wildcard.len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn audit_query_filters_and_orders() {
    let store = postgres_store().await;
    let (_, owner) = seed_owner(&store).await;
    let artefact = draft(&owner, "Audited", &[], Utc::now());
    insert(&store, &owner, &artefact).await;
    store
        .commit(
            vec![Mutation::SetStatus {
                artefact_id: artefact.id,
                expected: ArtefactStatus::Draft,
                next: ArtefactStatus::PendingReview,
                at: Utc::now(),
            }],
            audit(
                AuditAction::SubmittedForReview,
                &owner,
                TargetType::Artefact,
                artefact.id,
            ),
        )
        .await
        .unwrap();

    let by_actor = store
        .query_audit(&AuditQuery {
            actor_id: Some(owner.id),
            ..Default::default()
        })
        .await
        .unwrap();
    let actions: Vec<AuditAction> = by_actor.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::SubmittedForReview,
            AuditAction::ArtefactCreated,
            AuditAction::UserRegistered
        ]
    );

    let future = store
        .query_audit(&AuditQuery {
            actor_id: Some(owner.id),
            from: Some(Utc::now() + Duration::hours(1)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(future.is_empty());

    let users_only = store
        .query_audit(&AuditQuery {
            actor_id: Some(owner.id),
            target_type: Some(TargetType::User),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(users_only.len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn duplicates_and_dangling_references_conflict() {
    let store = postgres_store().await;
    let (region, owner) = seed_owner(&store).await;

    let again = store
        .seed_region(&region.region_name.to_uppercase())
        .await
        .unwrap();
    assert!(again.is_none());

    let mut duplicate = owner.clone();
    duplicate.id = UserId::new();
    let result = store
        .commit(
            vec![Mutation::InsertUser(duplicate.clone())],
            audit(AuditAction::UserRegistered, &duplicate, TargetType::User, duplicate.id),
        )
        .await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));

    let mut homeless = owner.clone();
    homeless.id = UserId::new();
    homeless.email = format!("homeless.{}@dkn.example", Uuid::new_v4());
    homeless.region_id = RegionId::new();
    let result = store
        .commit(
            vec![Mutation::InsertUser(homeless.clone())],
            audit(AuditAction::UserRegistered, &homeless, TargetType::User, homeless.id),
        )
        .await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
    assert!(store.find_user(homeless.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn ping_answers() {
    let store = postgres_store().await;
    store.ping().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn versions_and_audit_entries_are_write_once() {
    let pool = postgres_pool().await;
    let store = PostgresStore::new(pool.clone());
    let (_, owner) = seed_owner(&store).await;
    let artefact = draft(&owner, "Immutable", &[], Utc::now());
    let version = Version::new(artefact.id, 1, "blob://v1".to_string(), owner.id, Utc::now());
    store
        .commit(
            vec![Mutation::InsertArtefact {
                artefact: artefact.clone(),
                first_version: Some(version.clone()),
            }],
            audit(
                AuditAction::ArtefactCreated,
                &owner,
                TargetType::Artefact,
                artefact.id,
            ),
        )
        .await
        .unwrap();

    let rewrite = sqlx::query("UPDATE audit_log SET details = '{\"forged\": true}'::jsonb WHERE target_id = $1")
        .bind(artefact.id)
        .execute(&pool)
        .await;
    assert!(rewrite.is_err());

    let erase = sqlx::query("DELETE FROM audit_log WHERE target_id = $1")
        .bind(artefact.id)
        .execute(&pool)
        .await;
    assert!(erase.is_err());

    let delete = sqlx::query("DELETE FROM artefact_versions WHERE artefact_id = $1")
        .bind(artefact.id)
        .execute(&pool)
        .await;
    assert!(delete.is_err());

    let retarget = sqlx::query("UPDATE artefact_versions SET content_ref = 'blob://evil' WHERE id = $1")
        .bind(version.id)
        .execute(&pool)
        .await;
    assert!(retarget.is_err());

    let versions = store.list_versions(artefact.id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].content_ref, "blob://v1");
    let trail = store
        .query_audit(&AuditQuery::for_target(artefact.id))
        .await
        .unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].details, json!({}));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn region_scope_includes_own_work_elsewhere() {
    let store = postgres_store().await;
    let (home, owner) = seed_owner(&store).await;
    let (_, stranger) = seed_owner(&store).await;
    let mut moved = owner.clone();
    moved.region_id = stranger.region_id;
    let elsewhere = draft(&moved, "Own elsewhere", &[], Utc::now());
    let foreign = draft(&stranger, "Someone else's", &[], Utc::now());
    insert(&store, &owner, &elsewhere).await;
    insert(&store, &stranger, &foreign).await;
    let local = draft(&owner, "Home", &[], Utc::now());
    insert(&store, &owner, &local).await;

    let listed = store
        .list_artefacts(&ArtefactQuery {
            scope: Some(RegionScope {
                region_id: home.id,
                owner_id: owner.id,
            }),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<ArtefactId> = listed.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![local.id, elsewhere.id]);
}
