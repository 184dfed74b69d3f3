use tracing::warn;

use super::{authorize, Action, Decision, Resource};
use crate::common::error::{Error, Result};
use crate::domains::users::models::User;

/// Entry point for authorization checks
///
/// Usage:
/// ```ignore
/// Actor::new(&user)
///     .can(Action::Write)
///     .on(Resource::Artefact(&artefact))
///     .check()?;
/// ```
pub struct Actor<'a> {
    user: &'a User,
}

impl<'a> Actor<'a> {
    pub fn new(user: &'a User) -> Self {
        Self { user }
    }

    /// Specify what the actor wants to do
    pub fn can(self, action: Action) -> ActionBuilder<'a> {
        ActionBuilder {
            user: self.user,
            action,
        }
    }
}

/// Builder after specifying the action
pub struct ActionBuilder<'a> {
    user: &'a User,
    action: Action,
}

impl<'a> ActionBuilder<'a> {
    /// Specify the resource the action targets
    pub fn on<'r>(self, resource: Resource<'r>) -> PolicyCheck<'a, 'r> {
        PolicyCheck {
            user: self.user,
            action: self.action,
            resource,
        }
    }
}

/// A fully specified (actor, action, resource) triple
pub struct PolicyCheck<'a, 'r> {
    user: &'a User,
    action: Action,
    resource: Resource<'r>,
}

impl PolicyCheck<'_, '_> {
    /// Raw decision from the policy engine
    pub fn decide(&self) -> Decision {
        authorize(self.user, self.action, self.resource)
    }

    /// Fail with `Forbidden(reason)` on denial
    pub fn check(self) -> Result<()> {
        match self.decide() {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                warn!(
                    actor_id = %self.user.id,
                    action = %self.action.name(),
                    resource = self.resource.kind(),
                    reason = reason.code(),
                    "Policy denied request"
                );
                Err(Error::Forbidden(reason))
            }
        }
    }

    /// Fail with `NotFound(what)` on denial, so a caller who may not see a
    /// resource cannot tell it apart from one that does not exist.
    pub fn check_visible(self, what: &'static str) -> Result<()> {
        self.check().map_err(|_| Error::NotFound(what))
    }
}
