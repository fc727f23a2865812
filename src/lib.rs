// profile-stats library.
// GitHub profile statistics with an incremental lines-of-code cache.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod loc;
pub mod stats;

pub use error::{Result, StatsError};
