//! Audit domain actions
//!
//! Every policy-gated mutation reaches the store through [`record_with`], so
//! the state change and its audit entry share one unit of work.

mod query;
mod record;

pub use query::query_audit;
pub use record::{record, record_with};
