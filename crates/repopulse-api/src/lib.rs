// API client for the GitHub REST v3 endpoints repopulse needs
pub mod github;
pub mod models;
pub mod pagination;
pub mod rate_limit;

// Re-export common types
pub use github::{GitHubClient, GitHubError, SearchKind, UserListing};
pub use models::{
    Gist, GitHubRepo, GitHubUser, Issue, TrafficDay, TrafficKind, TrafficResponse,
};
pub use pagination::{PagePlan, DEFAULT_PAGE_LIMIT, PER_PAGE};
pub use rate_limit::RateLimit;
