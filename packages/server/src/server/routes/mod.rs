// HTTP routes
pub mod artefacts;
pub mod audit;
pub mod auth;
pub mod health;
pub mod regions;
pub mod users;

pub use artefacts::*;
pub use audit::*;
pub use auth::*;
pub use health::*;
pub use regions::*;
pub use users::*;
