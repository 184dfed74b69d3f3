//! Regions domain - immutable reference data

pub mod actions;
pub mod data;
pub mod models;
