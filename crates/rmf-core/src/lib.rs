pub mod config;
pub mod error;
pub mod github;
pub mod history;
pub mod lists;
pub mod oauth;
pub mod pool;
pub mod report;
pub mod tally;

pub use error::{FinderError, Result};
pub use tally::{RankedEntry, Tally};
