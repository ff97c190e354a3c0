// Batch report: rank a user's repositories by activity
use chrono::{DateTime, Utc};
use repopulse_api::{TrafficKind, UserListing};
use tracing::{debug, info};

use crate::{
    liveness::{filter_alive_forks, Lifespan},
    scoring::{rank, ScoreEntry},
    source::RepoSource,
    traffic::TrafficStore,
    Result,
};

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub user: String,
    pub lifespan: Lifespan,
    /// Reference time for liveness, normally now
    pub now: DateTime<Utc>,
}

impl ReportOptions {
    pub fn new(user: impl Into<String>, lifespan: Lifespan) -> Self {
        Self {
            user: user.into(),
            lifespan,
            now: Utc::now(),
        }
    }

    pub fn as_of(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Cumulative unique cloners and viewers held in the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficTotals {
    pub clones: u64,
    pub views: u64,
}

/// Walks a user's repositories one request at a time and scores them
pub struct Reporter<'a> {
    source: &'a dyn RepoSource,
    store: &'a TrafficStore,
}

impl<'a> Reporter<'a> {
    pub fn new(source: &'a dyn RepoSource, store: &'a TrafficStore) -> Self {
        Self { source, store }
    }

    /// Pull fresh clones then views for one repository into the ledger.
    /// The ledger file is rewritten after each kind.
    pub async fn refresh_traffic(&self, full_name: &str) -> Result<TrafficTotals> {
        let mut totals = TrafficTotals::default();

        for kind in TrafficKind::all() {
            let fresh = self.source.traffic(full_name, kind).await?;
            self.store.merge_traffic(full_name, kind, &fresh)?;
            let total = self.store.total_uniques(full_name, kind)?;

            match kind {
                TrafficKind::Clones => totals.clones = total,
                TrafficKind::Views => totals.views = total,
            }
        }

        Ok(totals)
    }

    /// Score one repository: alive forks (push order ignored), stars, traffic
    pub async fn score_repo(&self, repo: &crate::Repository, options: &ReportOptions) -> Result<ScoreEntry> {
        let forks = self.source.forks(&repo.full_name).await?;
        let fork_count = forks.len();
        let alive = filter_alive_forks(forks, repo.pushed_at, options.lifespan, false, options.now);
        debug!("{}: {} of {} forks alive", repo.full_name, alive.len(), fork_count);

        let traffic = self.refresh_traffic(&repo.full_name).await?;

        Ok(ScoreEntry::new(
            repo.label(),
            alive.len() as u64,
            u64::from(repo.stars),
            traffic.clones,
            traffic.views,
        ))
    }

    /// Every repository the user owns, highest score first
    pub async fn run(&self, options: &ReportOptions) -> Result<Vec<ScoreEntry>> {
        let repos = self.source.user_repos(&options.user, UserListing::Repos).await?;
        info!(
            "Scoring {} repositories for {} (lifespan {})",
            repos.len(),
            options.user,
            options.lifespan
        );

        let mut entries = Vec::with_capacity(repos.len());
        for repo in &repos {
            entries.push(self.score_repo(repo, options).await?);
        }

        Ok(rank(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockRepoSource;
    use crate::traffic::TrafficSample;
    use crate::{Error, Repository};
    use chrono::TimeZone;
    use mockall::predicate::eq;
    use tempfile::TempDir;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn repo(owner: &str, name: &str, stars: u32, archived: bool, pushed_at: DateTime<Utc>) -> Repository {
        Repository {
            owner: owner.to_string(),
            name: name.to_string(),
            full_name: format!("{}/{}", owner, name),
            description: None,
            url: format!("https://github.com/{}/{}", owner, name),
            language: None,
            license: None,
            stars,
            forks: 0,
            is_archived: archived,
            updated_at: None,
            pushed_at,
        }
    }

    fn samples(uniques: &[u64]) -> Vec<TrafficSample> {
        uniques
            .iter()
            .enumerate()
            .map(|(i, u)| TrafficSample::new(at(2024, 2, 1 + i as u32), *u))
            .collect()
    }

    fn options() -> ReportOptions {
        ReportOptions::new("octo", Lifespan::weeks(52)).as_of(at(2024, 3, 1))
    }

    #[tokio::test]
    async fn test_report_ranks_repositories() {
        let dir = TempDir::new().unwrap();
        let store = TrafficStore::new(dir.path().join("traffic.json"));
        let mut source = MockRepoSource::new();

        source
            .expect_user_repos()
            .with(eq("octo"), eq(UserListing::Repos))
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    repo("octo", "quiet", 1, false, at(2024, 1, 1)),
                    repo("octo", "busy", 10, true, at(2024, 1, 1)),
                ])
            });

        source.expect_forks().returning(|name| {
            Ok(match name {
                "octo/busy" => vec![
                    repo("alice", "busy", 0, false, at(2024, 2, 1)),
                    // older than the source, still counts
                    repo("bob", "busy", 0, false, at(2023, 6, 1)),
                    repo("carol", "busy", 0, false, at(2019, 1, 1)),
                ],
                _ => Vec::new(),
            })
        });

        source.expect_traffic().returning(|name, kind| {
            Ok(match (name, kind) {
                ("octo/busy", TrafficKind::Clones) => samples(&[1, 3]),
                ("octo/busy", TrafficKind::Views) => samples(&[1]),
                _ => Vec::new(),
            })
        });

        let reporter = Reporter::new(&source, &store);
        let ranked = reporter.run(&options()).await.unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], ScoreEntry::new("[Archived] octo/busy", 2, 10, 4, 1));
        assert_eq!(ranked[0].score, 65);
        assert_eq!(ranked[1], ScoreEntry::new("octo/quiet", 0, 1, 0, 0));
    }

    #[tokio::test]
    async fn test_rerun_does_not_double_count_traffic() {
        let dir = TempDir::new().unwrap();
        let store = TrafficStore::new(dir.path().join("traffic.json"));
        let mut source = MockRepoSource::new();

        source
            .expect_traffic()
            .returning(|_, _| Ok(samples(&[2, 2, 2])));

        let reporter = Reporter::new(&source, &store);
        let first = reporter.refresh_traffic("octo/tool").await.unwrap();
        let second = reporter.refresh_traffic("octo/tool").await.unwrap();

        assert_eq!(first, TrafficTotals { clones: 6, views: 6 });
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_fork_listing_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let store = TrafficStore::new(dir.path().join("traffic.json"));
        let mut source = MockRepoSource::new();

        source
            .expect_user_repos()
            .returning(|_, _| Ok(vec![repo("octo", "tool", 0, false, at(2024, 1, 1))]));
        source
            .expect_forks()
            .returning(|_| Err(Error::ApiError("connection reset".into())));

        let reporter = Reporter::new(&source, &store);
        let result = reporter.run(&options()).await;

        assert!(matches!(result, Err(Error::ApiError(_))));
        // nothing was merged, so no ledger was written
        assert!(!store.path().exists());
    }
}
