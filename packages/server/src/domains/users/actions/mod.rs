//! User domain actions - profile lookup and admin edits

mod get_user;
mod update_user;

pub use get_user::get_user;
pub use update_user::update_user;
