// GitHub provider - bridges the API client with the RepoSource trait
use async_trait::async_trait;
use repopulse_api::{GitHubClient, GitHubRepo, TrafficKind, UserListing};

use crate::{models::Repository, source::RepoSource, traffic::TrafficSample, Error, Result};

/// Wrapper around GitHubClient that implements RepoSource
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }
}

#[async_trait]
impl RepoSource for GitHubProvider {
    async fn user_repos(&self, user: &str, listing: UserListing) -> Result<Vec<Repository>> {
        let repos = self
            .client
            .list_user_repos(user, listing)
            .await
            .map_err(|e| Error::ApiError(e.to_string()))?;

        Ok(repos.into_iter().map(github_to_repo).collect())
    }

    async fn forks(&self, full_name: &str) -> Result<Vec<Repository>> {
        let forks = self
            .client
            .list_forks(full_name)
            .await
            .map_err(|e| Error::ApiError(e.to_string()))?;

        Ok(forks.into_iter().map(github_to_repo).collect())
    }

    async fn traffic(&self, full_name: &str, kind: TrafficKind) -> Result<Vec<TrafficSample>> {
        let traffic = self
            .client
            .get_repo_traffic(full_name, kind)
            .await
            .map_err(|e| Error::ApiError(e.to_string()))?;

        Ok(traffic.days.into_iter().map(TrafficSample::from).collect())
    }
}

/// Convert GitHub API repo to our internal Repository model
pub fn github_to_repo(gh: GitHubRepo) -> Repository {
    Repository {
        owner: gh.owner.login,
        name: gh.name,
        full_name: gh.full_name,
        description: gh.description,
        url: gh.html_url,
        language: gh.language,
        license: gh.license.map(|l| l.name),
        stars: gh.stargazers_count,
        forks: gh.forks_count,
        is_archived: gh.archived,
        updated_at: gh.updated_at,
        // Never pushed? Then creation is the last sign of life
        pushed_at: gh.pushed_at.or(gh.created_at).unwrap_or_default(),
    }
}
