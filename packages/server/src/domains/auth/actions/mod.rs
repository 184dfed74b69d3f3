//! Auth domain actions - registration and password login

mod login;
mod register;

pub use login::login;
pub use register::register;
