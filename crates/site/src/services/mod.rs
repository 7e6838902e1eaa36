//! Site services over the backend client.

pub mod catalog;
pub mod visits;

pub use catalog::Catalog;
pub use visits::{TRACKED_PAGES_KEY, VisitTracker};
