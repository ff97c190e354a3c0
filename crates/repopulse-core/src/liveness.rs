use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{models::Repository, time};

/// How long after its last push a repository still counts as alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifespan {
    weeks: u32,
}

impl Lifespan {
    pub fn weeks(weeks: u32) -> Self {
        Self { weeks }
    }

    pub fn duration(&self) -> Duration {
        Duration::weeks(i64::from(self.weeks))
    }
}

impl std::fmt::Display for Lifespan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} weeks", self.weeks)
    }
}

/// Alive means pushed to within `lifespan` of `now`
pub fn is_alive(pushed_at: DateTime<Utc>, now: DateTime<Utc>, lifespan: Lifespan) -> bool {
    time::add_saturating(pushed_at, lifespan.duration()) > now
}

/// Is the source repository itself still alive?
pub fn source_alive(repo: &Repository, lifespan: Lifespan, now: DateTime<Utc>) -> bool {
    is_alive(repo.pushed_at, now, lifespan)
}

/// Keep the forks that are alive.
///
/// With `require_newer` set, a fork must also have been pushed after the
/// source. Without it, push order relative to the source is ignored.
pub fn filter_alive_forks(
    forks: Vec<Repository>,
    source_pushed_at: DateTime<Utc>,
    lifespan: Lifespan,
    require_newer: bool,
    now: DateTime<Utc>,
) -> Vec<Repository> {
    forks
        .into_iter()
        .filter(|fork| {
            let alive = is_alive(fork.pushed_at, now, lifespan);
            let newer = fork.pushed_at > source_pushed_at;
            (alive && newer) || (alive && !require_newer)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn fork(owner: &str, pushed_at: DateTime<Utc>) -> Repository {
        Repository {
            owner: owner.to_string(),
            name: "tool".to_string(),
            full_name: format!("{}/tool", owner),
            description: None,
            url: format!("https://github.com/{}/tool", owner),
            language: Some("Rust".to_string()),
            license: None,
            stars: 0,
            forks: 0,
            is_archived: false,
            updated_at: None,
            pushed_at,
        }
    }

    fn owners(forks: &[Repository]) -> Vec<&str> {
        forks.iter().map(|f| f.owner.as_str()).collect()
    }

    #[test]
    fn test_is_alive_window_edges() {
        let pushed = at(2024, 1, 1);
        let lifespan = Lifespan::weeks(2);

        assert!(is_alive(pushed, at(2024, 1, 14), lifespan));
        // exactly at the boundary is no longer alive
        assert!(!is_alive(pushed, at(2024, 1, 15), lifespan));
        assert!(!is_alive(pushed, at(2024, 2, 1), lifespan));
    }

    #[test]
    fn test_is_alive_monotonic_in_elapsed_time() {
        let pushed = at(2024, 1, 1);
        let lifespan = Lifespan::weeks(4);
        let mut was_alive = true;

        for day in 0..90 {
            let now = pushed + Duration::days(day);
            let alive = is_alive(pushed, now, lifespan);
            // once dead, never alive again at a later time
            assert!(was_alive || !alive, "alive again on day {}", day);
            was_alive = alive;
        }
        assert!(!was_alive);
    }

    #[test]
    fn test_zero_lifespan_is_never_alive() {
        let now = at(2024, 1, 1);
        assert!(!is_alive(now, now, Lifespan::weeks(0)));
    }

    #[test]
    fn test_huge_lifespan_does_not_overflow() {
        assert!(is_alive(at(1990, 1, 1), at(2024, 1, 1), Lifespan::weeks(u32::MAX)));
    }

    #[test]
    fn test_source_alive() {
        let source = fork("octo", at(2024, 1, 1));
        assert!(source_alive(&source, Lifespan::weeks(10), at(2024, 2, 1)));
        assert!(!source_alive(&source, Lifespan::weeks(1), at(2024, 2, 1)));
    }

    #[test]
    fn test_filter_requires_newer_than_source() {
        let source_pushed = at(2024, 1, 1);
        let now = at(2024, 3, 1);
        let forks = vec![
            fork("alice", at(2024, 2, 1)), // alive and newer
            fork("bob", at(2023, 6, 1)),   // alive, older than source
            fork("carol", at(2020, 1, 1)), // long dead
        ];

        let alive = filter_alive_forks(forks, source_pushed, Lifespan::weeks(52), true, now);
        assert_eq!(owners(&alive), vec!["alice"]);
    }

    #[test]
    fn test_filter_ignores_newness_when_not_required() {
        let source_pushed = at(2024, 1, 1);
        let now = at(2024, 3, 1);
        let forks = vec![
            fork("alice", at(2024, 2, 1)),
            fork("bob", at(2023, 6, 1)),
            fork("carol", at(2020, 1, 1)),
        ];

        let alive = filter_alive_forks(forks, source_pushed, Lifespan::weeks(52), false, now);
        assert_eq!(owners(&alive), vec!["alice", "bob"]);
    }

    #[test]
    fn test_filter_short_lifespan_drops_older_fork() {
        let source_pushed = at(2024, 1, 1);
        let now = at(2024, 3, 1);
        let forks = vec![fork("alice", at(2024, 2, 1)), fork("bob", at(2023, 6, 1))];

        // bob is not alive with a 10 week window, regardless of the flag
        let alive = filter_alive_forks(forks, source_pushed, Lifespan::weeks(10), false, now);
        assert_eq!(owners(&alive), vec!["alice"]);
    }

    #[test]
    fn test_filter_same_push_time_is_not_newer() {
        let source_pushed = at(2024, 2, 1);
        let now = at(2024, 3, 1);
        let forks = vec![fork("twin", source_pushed)];

        assert!(filter_alive_forks(forks.clone(), source_pushed, Lifespan::weeks(52), true, now).is_empty());
        assert_eq!(
            filter_alive_forks(forks, source_pushed, Lifespan::weeks(52), false, now).len(),
            1
        );
    }
}
