//! Auth domain - password accounts and JWT sessions
//!
//! Responsibilities:
//! - Self-registration (consultant roles, admin allow-list)
//! - Email + password login
//! - Session/JWT token management

pub mod actions;
pub mod jwt;
pub mod types;

pub use jwt::{Claims, JwtService};
pub use types::{AuthPayload, LoginInput, RegisterInput};
