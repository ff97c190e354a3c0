use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Repository as returned by the list, get and search endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub full_name: String,
    pub owner: RepoOwner,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    pub license: Option<RepoLicense>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub fork: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Null for repositories nobody has pushed to yet
    pub pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoLicense {
    pub name: String,
}

/// User profile. List endpoints only fill in the first few fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub html_url: String,
    pub avatar_url: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
}

/// Issue (or pull request) from the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn is_closed(&self) -> bool {
        self.state == "closed"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gist {
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFile {
    pub filename: Option<String>,
    pub language: Option<String>,
}

/// README metadata - the content itself lives behind `download_url`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReadmeMeta {
    pub download_url: Option<String>,
}

/// The two daily metrics the traffic API reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficKind {
    Views,
    Clones,
}

impl TrafficKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficKind::Views => "views",
            TrafficKind::Clones => "clones",
        }
    }

    pub fn all() -> [TrafficKind; 2] {
        [TrafficKind::Clones, TrafficKind::Views]
    }
}

impl std::fmt::Display for TrafficKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `repos/{owner}/{repo}/traffic/{views|clones}`
///
/// The per-day list is keyed by the traffic kind, so both spellings map
/// onto `days`. An error payload decodes to an empty list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrafficResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
    #[serde(default, alias = "views", alias = "clones")]
    pub days: Vec<TrafficDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficDay {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub count: u64,
    pub uniques: u64,
}
