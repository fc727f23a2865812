// Lines-of-code engine.
// Walks commit history and keeps the per-repository cache current between runs.

pub mod aggregator;
pub mod provider;
pub mod walker;

pub use aggregator::{CacheLocation, LocSummary, reconcile};
pub use provider::HistoryProvider;
pub use walker::{WalkTotals, walk};
