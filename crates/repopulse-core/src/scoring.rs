use serde::{Deserialize, Serialize};

/// Forks still being worked on say the most about a repository
pub const ALIVE_FORK_WEIGHT: u64 = 8;
pub const STAR_WEIGHT: u64 = 4;
pub const CLONE_WEIGHT: u64 = 2;
pub const VIEW_WEIGHT: u64 = 1;

/// Weighted activity score: forks > stars > clones > views
pub fn score(alive_forks: u64, stars: u64, clones: u64, views: u64) -> u64 {
    alive_forks * ALIVE_FORK_WEIGHT + stars * STAR_WEIGHT + clones * CLONE_WEIGHT + views * VIEW_WEIGHT
}

/// One repository's line in the ranking, with the counts that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u64,
    pub label: String,
    pub alive_forks: u64,
    pub stars: u64,
    pub clones: u64,
    pub views: u64,
}

impl ScoreEntry {
    pub fn new(label: impl Into<String>, alive_forks: u64, stars: u64, clones: u64, views: u64) -> Self {
        Self {
            score: score(alive_forks, stars, clones, views),
            label: label.into(),
            alive_forks,
            stars,
            clones,
            views,
        }
    }
}

impl std::fmt::Display for ScoreEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: score={} ({}:{}:{}:{})",
            self.label, self.score, self.alive_forks, self.stars, self.clones, self.views
        )
    }
}

/// Highest score first. Equal scores keep the order they came in.
pub fn rank(mut entries: Vec<ScoreEntry>) -> Vec<ScoreEntry> {
    // sort_by is stable
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_weights() {
        assert_eq!(score(2, 10, 4, 1), 65);
        assert_eq!(score(0, 0, 0, 0), 0);
        assert_eq!(score(1, 0, 0, 0), 8);
        assert_eq!(score(0, 0, 0, 7), 7);
    }

    #[test]
    fn test_entry_computes_score() {
        let entry = ScoreEntry::new("octo/tool", 2, 10, 4, 1);
        assert_eq!(entry.score, 65);
        assert_eq!(entry.to_string(), "octo/tool: score=65 (2:10:4:1)");
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank(vec![
            ScoreEntry::new("low", 0, 1, 0, 0),
            ScoreEntry::new("high", 3, 0, 0, 0),
            ScoreEntry::new("mid", 0, 0, 5, 0),
        ]);
        let labels: Vec<_> = ranked.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        // all three score 8
        let ranked = rank(vec![
            ScoreEntry::new("first", 1, 0, 0, 0),
            ScoreEntry::new("top", 5, 0, 0, 0),
            ScoreEntry::new("second", 0, 2, 0, 0),
            ScoreEntry::new("third", 0, 0, 4, 0),
        ]);
        let labels: Vec<_> = ranked.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(Vec::new()).is_empty());
    }
}
