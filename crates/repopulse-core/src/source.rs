use repopulse_api::{TrafficKind, UserListing};

use crate::{models::Repository, traffic::TrafficSample, Result};

/// Where the report pipeline gets its repositories and traffic from.
///
/// The GitHub implementation lives in `providers`; tests use a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RepoSource: Send + Sync {
    /// Repositories owned, starred or watched by `user`, all pages resolved
    async fn user_repos(&self, user: &str, listing: UserListing) -> Result<Vec<Repository>>;

    /// Every fork of `owner/name`, up to the page cap
    async fn forks(&self, full_name: &str) -> Result<Vec<Repository>>;

    /// The trailing window of daily traffic, oldest day first
    async fn traffic(&self, full_name: &str, kind: TrafficKind) -> Result<Vec<TrafficSample>>;
}
