//! Artefact domain actions - business logic functions
//!
//! Every action authorizes through the policy engine before acting, and every
//! write goes through a single audited unit of work.

mod create;
mod queries;
mod transition;
mod update;
mod versions;

pub use create::create_artefact;
pub use queries::{get_artefact, list_artefacts};
pub use transition::transition_artefact;
pub use update::update_artefact;
pub use versions::add_version;
