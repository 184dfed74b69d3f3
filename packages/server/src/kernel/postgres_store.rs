//! PostgreSQL store.
//!
//! Every unit of work runs in one transaction. Status changes are
//! compare-and-set (`UPDATE ... WHERE status = $expected`), so of two racing
//! transitions on the same artefact exactly one sees a row to update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::error;
use uuid::Uuid;

use super::{BaseStore, Mutation, StoreError};
use crate::common::{ArtefactId, AuditLogId, RegionId, UserId};
use crate::domains::artefacts::data::ArtefactQuery;
use crate::domains::artefacts::models::{Artefact, Version};
use crate::domains::audit::data::AuditQuery;
use crate::domains::audit::models::AuditLogEntry;
use crate::domains::regions::models::Region;
use crate::domains::users::models::User;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Insert a region outside of any unit of work (bootstrap only).
    /// Returns `None` if a region with that name already exists.
    pub async fn seed_region(&self, region_name: &str) -> Result<Option<Region>, StoreError> {
        let region = Region::new(region_name);
        let row = sqlx::query_as::<_, Region>(
            "INSERT INTO regions (id, region_name, created_at)
             VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING
             RETURNING *",
        )
        .bind(region.id)
        .bind(&region.region_name)
        .bind(region.created_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    role: String,
    region_id: RegionId,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse().map_err(corrupt)?,
            region_id: row.region_id,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ArtefactRow {
    id: ArtefactId,
    title: String,
    description: String,
    tags: Vec<String>,
    classification: String,
    status: String,
    owner_id: UserId,
    region_id: RegionId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ArtefactRow> for Artefact {
    type Error = StoreError;

    fn try_from(row: ArtefactRow) -> Result<Self, Self::Error> {
        Ok(Artefact {
            id: row.id,
            title: row.title,
            description: row.description,
            tags: row.tags.into_iter().collect(),
            classification: row.classification.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            owner_id: row.owner_id,
            region_id: row.region_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: AuditLogId,
    action: String,
    actor_id: UserId,
    target_type: String,
    target_id: Uuid,
    details: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditLogEntry {
    type Error = StoreError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(AuditLogEntry {
            id: row.id,
            action: row.action.parse().map_err(corrupt)?,
            actor_id: row.actor_id,
            target_type: row.target_type.parse().map_err(corrupt)?,
            target_id: row.target_id,
            details: row.details,
            created_at: row.created_at,
        })
    }
}

fn corrupt(err: crate::common::Error) -> StoreError {
    error!(error = %err, "Corrupt row in database");
    StoreError::Unavailable(format!("corrupt row: {}", err))
}

fn map_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_foreign_key_violation() {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    err.into()
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

// ============================================================================
// Unit of work
// ============================================================================

async fn apply(tx: &mut Transaction<'_, Postgres>, mutation: Mutation) -> Result<(), StoreError> {
    match mutation {
        Mutation::InsertUser(user) => {
            sqlx::query(
                "INSERT INTO users (id, name, email, role, region_id, password_hash, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(user.region_id)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&mut **tx)
            .await
            .map_err(map_err)?;
        }
        Mutation::UpdateUser(user) => {
            let result = sqlx::query(
                "UPDATE users SET role = $2, region_id = $3, updated_at = $4 WHERE id = $1",
            )
            .bind(user.id)
            .bind(user.role.as_str())
            .bind(user.region_id)
            .bind(user.updated_at)
            .execute(&mut **tx)
            .await
            .map_err(map_err)?;
            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound("user"));
            }
        }
        Mutation::InsertRegion(region) => {
            sqlx::query("INSERT INTO regions (id, region_name, created_at) VALUES ($1, $2, $3)")
                .bind(region.id)
                .bind(&region.region_name)
                .bind(region.created_at)
                .execute(&mut **tx)
                .await
                .map_err(map_err)?;
        }
        Mutation::InsertArtefact {
            artefact,
            first_version,
        } => {
            let tags: Vec<String> = artefact.tags.iter().cloned().collect();
            sqlx::query(
                "INSERT INTO artefacts (id, title, description, tags, classification, status,
                                        owner_id, region_id, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(artefact.id)
            .bind(&artefact.title)
            .bind(&artefact.description)
            .bind(&tags)
            .bind(artefact.classification.as_str())
            .bind(artefact.status.as_str())
            .bind(artefact.owner_id)
            .bind(artefact.region_id)
            .bind(artefact.created_at)
            .bind(artefact.updated_at)
            .execute(&mut **tx)
            .await
            .map_err(map_err)?;

            if let Some(version) = first_version {
                if version.sequence != 1 {
                    return Err(StoreError::Conflict("first version must be 1".into()));
                }
                insert_version(tx, &version).await?;
            }
        }
        Mutation::UpdateArtefact {
            artefact,
            expected_status,
        } => {
            let tags: Vec<String> = artefact.tags.iter().cloned().collect();
            let result = sqlx::query(
                "UPDATE artefacts
                 SET title = $3, description = $4, tags = $5, classification = $6, updated_at = $7
                 WHERE id = $1 AND status = $2",
            )
            .bind(artefact.id)
            .bind(expected_status.as_str())
            .bind(&artefact.title)
            .bind(&artefact.description)
            .bind(&tags)
            .bind(artefact.classification.as_str())
            .bind(artefact.updated_at)
            .execute(&mut **tx)
            .await
            .map_err(map_err)?;
            if result.rows_affected() == 0 {
                return Err(missing_or_stale(tx, artefact.id).await);
            }
        }
        Mutation::InsertVersion(version) => {
            let locked: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM artefacts WHERE id = $1 FOR UPDATE")
                    .bind(version.artefact_id)
                    .fetch_optional(&mut **tx)
                    .await
                    .map_err(map_err)?;
            if locked.is_none() {
                return Err(StoreError::NotFound("artefact"));
            }

            let (current,): (i32,) = sqlx::query_as(
                "SELECT COALESCE(MAX(sequence), 0) FROM artefact_versions WHERE artefact_id = $1",
            )
            .bind(version.artefact_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(map_err)?;
            if version.sequence != current + 1 {
                return Err(StoreError::Conflict(format!(
                    "version {} already exists",
                    version.sequence
                )));
            }

            insert_version(tx, &version).await?;
            sqlx::query("UPDATE artefacts SET updated_at = $2 WHERE id = $1")
                .bind(version.artefact_id)
                .bind(version.created_at)
                .execute(&mut **tx)
                .await
                .map_err(map_err)?;
        }
        Mutation::SetStatus {
            artefact_id,
            expected,
            next,
            at,
        } => {
            let result = sqlx::query(
                "UPDATE artefacts SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2",
            )
            .bind(artefact_id)
            .bind(expected.as_str())
            .bind(next.as_str())
            .bind(at)
            .execute(&mut **tx)
            .await
            .map_err(map_err)?;
            if result.rows_affected() == 0 {
                return Err(missing_or_stale(tx, artefact_id).await);
            }
        }
    }
    Ok(())
}

async fn insert_version(
    tx: &mut Transaction<'_, Postgres>,
    version: &Version,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO artefact_versions (id, artefact_id, sequence, content_ref, uploaded_by, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(version.id)
    .bind(version.artefact_id)
    .bind(version.sequence)
    .bind(&version.content_ref)
    .bind(version.uploaded_by)
    .bind(version.created_at)
    .execute(&mut **tx)
    .await
    .map_err(map_err)?;
    Ok(())
}

async fn missing_or_stale(tx: &mut Transaction<'_, Postgres>, id: ArtefactId) -> StoreError {
    let exists = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM artefacts WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await;
    match exists {
        Ok(Some(_)) => StoreError::Conflict("artefact status changed".into()),
        Ok(None) => StoreError::NotFound("artefact"),
        Err(e) => map_err(e),
    }
}

#[async_trait]
impl BaseStore for PostgresStore {
    async fn commit(
        &self,
        mutations: Vec<Mutation>,
        audit: AuditLogEntry,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;

        for mutation in mutations {
            apply(&mut tx, mutation).await?;
        }

        sqlx::query(
            "INSERT INTO audit_log (id, action, actor_id, target_type, target_id, details, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(audit.id)
        .bind(audit.action.as_str())
        .bind(audit.actor_id)
        .bind(audit.target_type.as_str())
        .bind(audit.target_id)
        .bind(&audit.details)
        .bind(audit.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        tx.commit().await.map_err(map_err)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn list_regions(&self) -> Result<Vec<Region>, StoreError> {
        let regions = sqlx::query_as::<_, Region>("SELECT * FROM regions ORDER BY region_name")
            .fetch_all(&self.pool)
            .await?;
        Ok(regions)
    }

    async fn find_region(&self, id: RegionId) -> Result<Option<Region>, StoreError> {
        let region = sqlx::query_as::<_, Region>("SELECT * FROM regions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(region)
    }

    async fn find_artefact(&self, id: ArtefactId) -> Result<Option<Artefact>, StoreError> {
        sqlx::query_as::<_, ArtefactRow>("SELECT * FROM artefacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Artefact::try_from)
            .transpose()
    }

    async fn list_versions(&self, artefact_id: ArtefactId) -> Result<Vec<Version>, StoreError> {
        let versions = sqlx::query_as::<_, Version>(
            "SELECT * FROM artefact_versions WHERE artefact_id = $1 ORDER BY sequence ASC",
        )
        .bind(artefact_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(versions)
    }

    async fn list_artefacts(&self, query: &ArtefactQuery) -> Result<Vec<Artefact>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM artefacts WHERE 1=1");

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(classification) = query.classification {
            builder
                .push(" AND classification = ")
                .push_bind(classification.as_str());
        }
        if let Some(owner_id) = query.owner_id {
            builder.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(region_id) = query.region_id {
            builder.push(" AND region_id = ").push_bind(region_id);
        }
        if let Some(scope) = query.scope {
            builder
                .push(" AND (region_id = ")
                .push_bind(scope.region_id)
                .push(" OR owner_id = ")
                .push_bind(scope.owner_id)
                .push(")");
        }
        if let Some(term) = &query.search {
            let pattern = escape_like(term);
            builder
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE ")
                .push_bind(pattern)
                .push("))");
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        builder
            .build_query_as::<ArtefactRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Artefact::try_from)
            .collect()
    }

    async fn query_audit(&self, query: &AuditQuery) -> Result<Vec<AuditLogEntry>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM audit_log WHERE 1=1");

        if let Some(action) = query.action {
            builder.push(" AND action = ").push_bind(action.as_str());
        }
        if let Some(target_type) = query.target_type {
            builder
                .push(" AND target_type = ")
                .push_bind(target_type.as_str());
        }
        if let Some(actor_id) = query.actor_id {
            builder.push(" AND actor_id = ").push_bind(actor_id);
        }
        if let Some(target_id) = query.target_id {
            builder.push(" AND target_id = ").push_bind(target_id);
        }
        if let Some(from) = query.from {
            builder.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = query.to {
            builder.push(" AND created_at < ").push_bind(to);
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        builder
            .build_query_as::<AuditRow>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(AuditLogEntry::try_from)
            .collect()
    }
}
