//! In-memory test harness.
//!
//! Every harness owns a fresh `MemoryStore` with two regions ("North" and
//! "South") and the full router, so tests exercise the same middleware,
//! extractors and error mapping as production.

use std::sync::Arc;

use axum::Router;
use dkn_core::common::auth::password::hash_password;
use dkn_core::common::auth::Role;
use dkn_core::common::{RegionId, UserId};
use dkn_core::domains::auth::JwtService;
use dkn_core::domains::regions::models::Region;
use dkn_core::domains::users::models::User;
use dkn_core::kernel::{BaseStore, MemoryStore, ServerDeps};
use dkn_core::server::build_app;

use super::ApiClient;

pub const TEST_PASSWORD: &str = "correct horse battery";
pub const ADMIN_EMAIL: &str = "root@dkn.example";

pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub deps: ServerDeps,
    pub app: Router,
    pub north: RegionId,
    pub south: RegionId,
}

impl TestHarness {
    pub async fn new() -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let store = Arc::new(MemoryStore::new());
        let north = Region::new("North");
        let south = Region::new("South");
        let (north_id, south_id) = (north.id, south.id);
        store.seed_region(north).await;
        store.seed_region(south).await;

        let jwt_service = Arc::new(JwtService::new(
            "test_secret_key",
            "test_issuer".to_string(),
            1,
        ));
        let deps = ServerDeps::new(store.clone(), jwt_service, vec![ADMIN_EMAIL.to_string()]);
        let app = build_app(deps.clone(), &[]);

        Self {
            store,
            deps,
            app,
            north: north_id,
            south: south_id,
        }
    }

    /// Insert a user directly (no audit entry) with password [`TEST_PASSWORD`].
    pub async fn seed_user(&self, name: &str, role: Role, region_id: RegionId) -> User {
        let user = User {
            id: UserId::new(),
            name: name.to_string(),
            email: format!("{}.{}@dkn.example", name.to_lowercase(), UserId::new()),
            role,
            region_id,
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        self.store.seed_user(user.clone()).await;
        user
    }

    pub fn token_for(&self, user: &User) -> String {
        self.deps.jwt_service.create_token(user.id).unwrap()
    }

    /// Client authenticated as `user`
    pub fn client(&self, user: &User) -> ApiClient {
        ApiClient::new(self.app.clone(), Some(self.token_for(user)))
    }

    /// Client without credentials
    pub fn anonymous(&self) -> ApiClient {
        ApiClient::new(self.app.clone(), None)
    }

    pub fn store(&self) -> &dyn BaseStore {
        self.store.as_ref()
    }
}
