//! Audit domain - append-only record of every policy-gated mutation

pub mod actions;
pub mod data;
pub mod models;
