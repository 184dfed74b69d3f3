//! Identity, roles and the policy engine.
//!
//! All authorization decisions go through one place:
//!
//! ```ignore
//! use crate::common::auth::{Action, Actor, Resource};
//!
//! Actor::new(&user)
//!     .can(Action::Transition(LifecycleEvent::Approve))
//!     .on(Resource::Artefact(&artefact))
//!     .check()?;
//! ```
//!
//! Handlers and actions never compare role strings themselves.

mod builder;
mod capability;
mod errors;
pub mod password;
mod policy;
mod role;

pub use builder::{ActionBuilder, Actor, PolicyCheck};
pub use capability::{Action, Resource};
pub use errors::DenyReason;
pub use policy::{authorize, Decision};
pub use role::{Role, RoleGroup};
