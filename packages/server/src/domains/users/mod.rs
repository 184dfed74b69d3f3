//! Users domain - profiles, roles and region membership

pub mod actions;
pub mod data;
pub mod models;

pub use data::UserData;
pub use models::User;
