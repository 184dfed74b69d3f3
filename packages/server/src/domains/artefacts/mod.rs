//! Artefacts domain - knowledge artefacts, their versions and lifecycle

pub mod actions;
pub mod data;
pub mod machines;
pub mod models;
