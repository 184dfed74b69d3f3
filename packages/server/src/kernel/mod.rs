//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod memory_store;
pub mod postgres_store;
pub mod traits;

pub use deps::ServerDeps;
pub use memory_store::MemoryStore;
pub use postgres_store::PostgresStore;
pub use traits::*;
