use crate::common::auth::{Action, Actor, Resource};
use crate::common::{Error, Result, UserId};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Load a user profile. Admins and reviewers see anyone, others only themselves.
pub async fn get_user(deps: &ServerDeps, actor: &User, id: UserId) -> Result<User> {
    let user = deps
        .store
        .find_user(id)
        .await?
        .ok_or(Error::NotFound("user"))?;

    Actor::new(actor)
        .can(Action::Read)
        .on(Resource::User(&user))
        .check()?;

    Ok(user)
}
