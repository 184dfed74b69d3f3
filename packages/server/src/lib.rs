// Digital Knowledge Network - API Core
//
// Access control, artefact lifecycle and audit trail for a consultancy's
// knowledge library. Every request is authorized by the policy engine in
// common::auth; every mutation is committed together with its audit entry.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
