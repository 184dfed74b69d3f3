// Business domains
pub mod artefacts;
pub mod audit;
pub mod auth;
pub mod regions;
pub mod users;
