// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod error;
pub mod id;

pub use auth::{Action, Actor, Decision, DenyReason, Resource, Role, RoleGroup};
pub use entity_ids::*;
pub use error::{Error, Result};
pub use id::Id;
