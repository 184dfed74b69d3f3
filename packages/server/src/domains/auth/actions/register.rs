//! Self-registration

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::common::auth::password::hash_password;
use crate::common::auth::{DenyReason, Role, RoleGroup};
use crate::common::{Error, RegionId, Result, UserId};
use crate::domains::audit::actions::record_with;
use crate::domains::audit::models::{AuditAction, TargetType};
use crate::domains::auth::types::{AuthPayload, RegisterInput};
use crate::domains::users::models::{normalize_email, User};
use crate::domains::users::UserData;
use crate::kernel::{Mutation, ServerDeps};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Create an account and sign it in.
///
/// Self-service users may only pick a consultant-group role. Emails listed in
/// the admin allow-list are registered as `system_admin` regardless of the
/// requested role.
pub async fn register(deps: &ServerDeps, input: RegisterInput) -> Result<AuthPayload> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Name is required"));
    }

    let email = normalize_email(&input.email);
    if !is_plausible_email(&email) {
        return Err(Error::validation("Invalid email"));
    }

    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let region_id =
        RegionId::parse(&input.region_id).map_err(|_| Error::validation("Invalid regionId"))?;
    if deps.store.find_region(region_id).await?.is_none() {
        return Err(Error::validation("Unknown region"));
    }

    let role = if deps.is_admin_email(&email) {
        Role::SystemAdmin
    } else {
        let requested = match input.role.as_deref().map(str::trim) {
            Some(role) if !role.is_empty() => role.parse()?,
            _ => Role::JuniorConsultant,
        };
        if requested.group() != RoleGroup::Consultant {
            return Err(Error::Forbidden(DenyReason::InsufficientRole));
        }
        requested
    };

    if deps.store.find_user_by_email(&email).await?.is_some() {
        return Err(Error::Conflict("Email already registered".to_string()));
    }

    let now = Utc::now();
    let user = User {
        id: UserId::new(),
        name,
        email,
        role,
        region_id,
        password_hash: hash_password(&input.password)?,
        created_at: now,
        updated_at: now,
    };

    record_with(
        deps.store.as_ref(),
        vec![Mutation::InsertUser(user.clone())],
        AuditAction::UserRegistered,
        &user,
        TargetType::User,
        user.id,
        json!({ "role": user.role, "regionId": user.region_id }),
    )
    .await?;

    info!(user_id = %user.id, role = %user.role, "User registered");

    let token = deps
        .jwt_service
        .create_token(user.id)
        .map_err(|e| Error::Internal(e.to_string()))?;

    Ok(AuthPayload {
        token,
        user: UserData::from(&user),
    })
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
