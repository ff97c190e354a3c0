use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::models::{Gist, GitHubRepo, GitHubUser, Issue, ReadmeMeta, TrafficKind, TrafficResponse};
use crate::pagination::{self, PagePlan, DEFAULT_PAGE_LIMIT, PER_PAGE};
use crate::rate_limit::RateLimit;

const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// Per-user repository listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserListing {
    /// Public repositories owned by the user
    Repos,
    /// Repositories the user has starred
    Starred,
    /// Repositories the user is watching
    Subscriptions,
}

impl UserListing {
    pub fn as_path(&self) -> &'static str {
        match self {
            UserListing::Repos => "repos",
            UserListing::Starred => "starred",
            UserListing::Subscriptions => "subscriptions",
        }
    }
}

/// Search scopes we know how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Repositories,
    Issues,
    Users,
}

impl SearchKind {
    pub fn as_path(&self) -> &'static str {
        match self {
            SearchKind::Repositories => "repositories",
            SearchKind::Issues => "issues",
            SearchKind::Users => "users",
        }
    }
}

/// Thin GitHub REST client.
///
/// Requests go out one at a time. Every response has its rate limit headers
/// checked, and any body carrying a `message` field instead of data gets
/// logged before being handed back, so callers keep going with whatever
/// they got.
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
    page_limit: u32,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise, or a mock server in tests
    pub fn with_base_url(token: Option<String>, base_url: String) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| GitHubError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("repopulse/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            token,
            base_url,
            page_limit: DEFAULT_PAGE_LIMIT,
        })
    }

    /// Cap how many pages a listing may span. Anything past the cap is dropped.
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    async fn send(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("GET {} {:?}", url, query);

        let mut request = self.client.get(&url).query(query);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if let Some(limit) = RateLimit::from_headers(response.headers()) {
            if limit.is_exhausted() {
                error!(
                    "Remaining rate limit is zero. Try again at {}",
                    limit.reset.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }

        Ok(response)
    }

    async fn decode(response: reqwest::Response) -> Result<Value> {
        let url = response.url().to_string();
        let body: Value = response.json().await?;

        if let Some(message) = error_message(&body) {
            error!("Some error has occurred for {}: {}", url, message);
        }

        Ok(body)
    }

    /// Single request, raw JSON back
    pub async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self.send(path, query).await?;
        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_json(path, &[]).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Walk a list endpoint and glue the pages together in the order served.
    ///
    /// The first page's `Link` header tells us how many pages exist. Past
    /// `page_limit` the rest is skipped with a warning. A page that comes
    /// back as an error payload contributes nothing.
    pub async fn fetch_all_pages(&self, path: &str) -> Result<Vec<Value>> {
        let per_page = PER_PAGE.to_string();

        let first = self.send(path, &[("per_page", per_page.as_str())]).await?;
        let last_page = pagination::last_page(first.headers());
        let mut items = page_items(Self::decode(first).await?);

        let plan = PagePlan::new(last_page, self.page_limit);
        if plan.is_truncated() {
            warn!(
                "{} spans {} pages, over the limit of {}. Only the first {} pages are fetched",
                path, last_page, self.page_limit, plan.pages
            );
        }

        for page in 2..=plan.pages {
            let page = page.to_string();
            let response = self
                .send(path, &[("per_page", per_page.as_str()), ("page", page.as_str())])
                .await?;
            items.extend(page_items(Self::decode(response).await?));
        }

        debug!("{} returned {} items", path, items.len());
        Ok(items)
    }

    async fn fetch_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let items = self.fetch_all_pages(path).await?;
        Ok(serde_json::from_value(Value::Array(items))?)
    }

    /// Repositories owned, starred or watched by a user
    pub async fn list_user_repos(&self, user: &str, listing: UserListing) -> Result<Vec<GitHubRepo>> {
        self.fetch_all(&format!("users/{}/{}", user, listing.as_path()))
            .await
    }

    pub async fn list_user_gists(&self, user: &str) -> Result<Vec<Gist>> {
        self.fetch_all(&format!("users/{}/gists", user)).await
    }

    /// Forks of `owner/name`
    pub async fn list_forks(&self, full_name: &str) -> Result<Vec<GitHubRepo>> {
        self.fetch_all(&format!("repos/{}/forks", full_name)).await
    }

    pub async fn list_stargazers(&self, full_name: &str) -> Result<Vec<GitHubUser>> {
        self.fetch_all(&format!("repos/{}/stargazers", full_name))
            .await
    }

    /// Daily traffic for the trailing window GitHub keeps. Needs push access;
    /// without it the error payload decodes to an empty sample list.
    pub async fn get_repo_traffic(&self, full_name: &str, kind: TrafficKind) -> Result<TrafficResponse> {
        self.get(&format!("repos/{}/traffic/{}", full_name, kind.as_str()))
            .await
    }

    pub async fn get_user(&self, login: &str) -> Result<GitHubUser> {
        self.get(&format!("users/{}", login)).await
    }

    pub async fn get_repo(&self, full_name: &str) -> Result<GitHubRepo> {
        self.get(&format!("repos/{}", full_name)).await
    }

    /// Raw README text for `owner/name`
    pub async fn get_readme(&self, full_name: &str) -> Result<String> {
        let meta: ReadmeMeta = self.get(&format!("repos/{}/readme", full_name)).await?;
        let download_url = meta
            .download_url
            .ok_or_else(|| GitHubError::NotFound(format!("README for {}", full_name)))?;

        debug!("GET {}", download_url);
        let response = self.client.get(&download_url).send().await?;
        if !response.status().is_success() {
            return Err(GitHubError::RequestFailed(format!(
                "Status {} downloading README for {}",
                response.status(),
                full_name
            )));
        }

        Ok(response.text().await?)
    }

    pub async fn search_repositories(&self, term: &str) -> Result<Vec<GitHubRepo>> {
        self.search(SearchKind::Repositories, term).await
    }

    pub async fn search_issues(&self, term: &str) -> Result<Vec<Issue>> {
        self.search(SearchKind::Issues, term).await
    }

    pub async fn search_users(&self, term: &str) -> Result<Vec<GitHubUser>> {
        self.search(SearchKind::Users, term).await
    }

    /// One page of up to 100 results, most starred first
    async fn search<T: DeserializeOwned>(&self, kind: SearchKind, term: &str) -> Result<Vec<T>> {
        let per_page = PER_PAGE.to_string();
        let body = self
            .get_json(
                &format!("search/{}", kind.as_path()),
                &[("q", term), ("sort", "stars"), ("per_page", per_page.as_str())],
            )
            .await?;

        let items = match body {
            Value::Object(mut map) => map.remove("items").unwrap_or(Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };
        Ok(serde_json::from_value(items)?)
    }
}

/// The `message` of an error payload, if that is what we got
fn error_message(body: &Value) -> Option<&str> {
    body.as_object()?.get("message")?.as_str()
}

fn page_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}
