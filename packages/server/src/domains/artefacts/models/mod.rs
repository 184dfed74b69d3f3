pub mod artefact;
pub mod version;

pub use artefact::*;
pub use version::*;
