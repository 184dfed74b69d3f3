//! Server dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! actions. Persistence goes through the `BaseStore` trait so tests can run
//! against `MemoryStore`.

use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::domains::users::models::normalize_email;
use crate::kernel::BaseStore;

/// Server dependencies accessible to actions
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseStore>,
    /// JWT service for token creation
    pub jwt_service: Arc<JwtService>,
    /// Emails that are granted `system_admin` on registration
    pub admin_emails: Vec<String>,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseStore>,
        jwt_service: Arc<JwtService>,
        admin_emails: Vec<String>,
    ) -> Self {
        Self {
            store,
            jwt_service,
            admin_emails: admin_emails.iter().map(|e| normalize_email(e)).collect(),
        }
    }

    /// `email` must already be normalized
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e == email)
    }
}
