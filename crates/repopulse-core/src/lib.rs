// Core logic - liveness, the traffic ledger and scoring all live here
pub mod config;
pub mod error;
pub mod liveness;
pub mod models;
pub mod providers;
pub mod report;
pub mod scoring;
pub mod source;
pub mod time;
pub mod traffic;

pub use config::Config;
pub use error::Error;
pub use liveness::{filter_alive_forks, is_alive, source_alive, Lifespan};
pub use models::Repository;
pub use report::{ReportOptions, Reporter, TrafficTotals};
pub use scoring::{rank, score, ScoreEntry};
pub use source::RepoSource;
pub use traffic::{TrafficLedger, TrafficSample, TrafficStore};

pub use repopulse_api::{TrafficKind, UserListing};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
