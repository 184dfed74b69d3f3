//! Password login

use tracing::{info, warn};

use crate::common::auth::password::{verify_password, UNMATCHABLE_HASH};
use crate::common::{Error, Result};
use crate::domains::auth::types::{AuthPayload, LoginInput};
use crate::domains::users::models::normalize_email;
use crate::domains::users::UserData;
use crate::kernel::ServerDeps;

/// Exchange email + password for a bearer token.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(deps: &ServerDeps, input: LoginInput) -> Result<AuthPayload> {
    let email = normalize_email(&input.email);

    let user = match deps.store.find_user_by_email(&email).await? {
        Some(user) if verify_password(&input.password, &user.password_hash) => user,
        Some(_) => {
            warn!("Failed login attempt");
            return Err(Error::Unauthenticated);
        }
        None => {
            // Same hashing cost as a known email
            verify_password(&input.password, UNMATCHABLE_HASH);
            warn!("Failed login attempt");
            return Err(Error::Unauthenticated);
        }
    };

    let token = deps
        .jwt_service
        .create_token(user.id)
        .map_err(|e| Error::Internal(e.to_string()))?;

    info!(user_id = %user.id, "User logged in");
    Ok(AuthPayload {
        token,
        user: UserData::from(&user),
    })
}
