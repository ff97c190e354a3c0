use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a repository as fetched. Identity is `owner/name`, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub language: Option<String>,
    pub license: Option<String>,
    pub stars: u32,
    pub forks: u32,
    pub is_archived: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: DateTime<Utc>,
}

impl Repository {
    /// Name used in reports, flagged when the repository is archived
    pub fn label(&self) -> String {
        if self.is_archived {
            format!("[Archived] {}", self.full_name)
        } else {
            self.full_name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(archived: bool) -> Repository {
        Repository {
            owner: "octo".to_string(),
            name: "tool".to_string(),
            full_name: "octo/tool".to_string(),
            description: None,
            url: "https://github.com/octo/tool".to_string(),
            language: None,
            license: None,
            stars: 0,
            forks: 0,
            is_archived: archived,
            updated_at: None,
            pushed_at: Utc::now(),
        }
    }

    #[test]
    fn test_label_marks_archived() {
        assert_eq!(repo(false).label(), "octo/tool");
        assert_eq!(repo(true).label(), "[Archived] octo/tool");
    }
}
