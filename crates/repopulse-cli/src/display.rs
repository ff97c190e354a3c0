// Terminal output for the REPL: item formatting and a page-at-a-time printer
use crossterm::style::{style, Stylize};
use repopulse_api::{Gist, GitHubRepo, GitHubUser, Issue};
use std::io::{self, BufRead, Write};

/// Prints items in pages, waiting for Enter between them
pub struct Pager<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Pager<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// `max_pages` of 0 means no cap. Stops early if input runs dry.
    pub fn show<T>(
        &mut self,
        items: &[T],
        per_page: usize,
        max_pages: usize,
        format: impl Fn(&T) -> String,
    ) -> io::Result<()> {
        let per_page = per_page.max(1);
        let total_pages = items.len().div_ceil(per_page).max(1);

        for (index, item) in items.iter().enumerate() {
            let page = index / per_page;
            if max_pages != 0 && page >= max_pages {
                return Ok(());
            }

            if index > 0 && index % per_page == 0 {
                write!(self.output, "Page {} of {} (Next)>", page, total_pages)?;
                self.output.flush()?;

                let mut line = String::new();
                if self.input.read_line(&mut line)? == 0 {
                    writeln!(self.output)?;
                    return Ok(());
                }
            }

            writeln!(self.output, "{}", format(item))?;
        }

        Ok(())
    }
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("[unknown]")
}

pub fn format_repo(repo: &GitHubRepo) -> String {
    let archived = if repo.archived {
        format!("[{}] ", style("Archived").red())
    } else {
        String::new()
    };
    let updated = repo
        .updated_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "[unknown]".to_string());

    format!(
        "{}{}\n{}\nLanguage: {}, License: {}, Last Updated: {}\nLink: {}",
        archived,
        style(&repo.name).bold(),
        repo.description.as_deref().unwrap_or("[description]"),
        or_unknown(repo.language.as_deref()),
        or_unknown(repo.license.as_ref().map(|l| l.name.as_str())),
        updated,
        repo.html_url
    )
}

pub fn format_issue(issue: &Issue) -> String {
    let closed = if issue.is_closed() {
        format!("[{}] ", style("Closed").red())
    } else {
        String::new()
    };

    format!(
        "{}{}\n{}",
        closed,
        style(&issue.title).bold(),
        issue.updated_at.to_rfc3339()
    )
}

pub fn format_user(user: &GitHubUser) -> String {
    format!("{}\n{}", style(&user.login).bold(), user.html_url)
}

pub fn format_gist(gist: &Gist) -> String {
    let files: Vec<&str> = gist.files.keys().map(String::as_str).collect();
    format!(
        "{}\n{}\n{}",
        style(gist.description.as_deref().unwrap_or("[no description]")).bold(),
        style(format!("Files: {}", files.join(", "))).bold(),
        gist.html_url
    )
}

pub fn format_profile(user: &GitHubUser) -> String {
    format!(
        "{}\n{}\nAvatar: {}\nCompany: {}\nLocation: {}\nEmail: {}\nFollowers: {} Following: {}",
        style(user.name.as_deref().unwrap_or(&user.login)).bold(),
        user.login,
        or_unknown(user.avatar_url.as_deref()),
        or_unknown(user.company.as_deref()),
        or_unknown(user.location.as_deref()),
        or_unknown(user.email.as_deref()),
        user.followers,
        user.following
    )
}

/// Markdown rendered for the terminal, one entry per line
pub fn render_markdown(raw: &str) -> Vec<String> {
    let skin = termimad::MadSkin::default();
    skin.term_text(raw)
        .to_string()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Wipe the terminal before a full-screen view
pub fn clear_screen() -> io::Result<()> {
    use crossterm::{cursor::MoveTo, execute, terminal::{Clear, ClearType}};
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn paged(items: &[u32], per_page: usize, max_pages: usize, input: &str) -> String {
        let mut output = Vec::new();
        let mut pager = Pager::new(Cursor::new(input.as_bytes().to_vec()), &mut output);
        pager
            .show(items, per_page, max_pages, |n| format!("item {}", n))
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_single_page_has_no_prompt() {
        let out = paged(&[1, 2, 3], 8, 0, "");
        assert_eq!(out, "item 1\nitem 2\nitem 3\n");
    }

    #[test]
    fn test_prompts_between_pages() {
        let out = paged(&[1, 2, 3, 4, 5], 2, 0, "\n\n");
        assert_eq!(out.matches("(Next)>").count(), 2);
        assert!(out.contains("Page 1 of 3 (Next)>item 3"));
        assert!(out.ends_with("item 5\n"));
    }

    #[test]
    fn test_max_pages_cuts_output() {
        let out = paged(&[1, 2, 3, 4, 5], 2, 1, "\n\n");
        assert_eq!(out, "item 1\nitem 2\n");
    }

    #[test]
    fn test_stops_when_input_ends() {
        let out = paged(&[1, 2, 3], 1, 0, "");
        assert!(out.starts_with("item 1\nPage 1 of 3 (Next)>"));
        assert!(!out.contains("item 2"));
    }

    #[test]
    fn test_format_issue_marks_closed() {
        let issue: Issue = serde_json::from_str(
            r#"{"title":"Crash on start","state":"closed","html_url":"https://github.com/o/r/issues/1","updated_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let text = format_issue(&issue);
        assert!(text.contains("Closed"));
        assert!(text.contains("Crash on start"));
    }

    #[test]
    fn test_format_repo_fills_unknowns() {
        let repo: GitHubRepo = serde_json::from_str(
            r#"{"name":"tool","full_name":"o/tool","owner":{"login":"o"},"description":null,
                "html_url":"https://github.com/o/tool","language":null,"license":null,
                "created_at":null,"updated_at":null,"pushed_at":null}"#,
        )
        .unwrap();
        let text = format_repo(&repo);
        assert!(text.contains("[description]"));
        assert!(text.contains("Language: [unknown], License: [unknown]"));
        assert!(text.ends_with("Link: https://github.com/o/tool"));
        assert!(!text.contains("Archived"));
    }

    #[test]
    fn test_render_markdown_keeps_text() {
        let lines = render_markdown("# Title\n\nSome *body* text.");
        assert!(lines.iter().any(|l| l.contains("Title")));
        assert!(lines.iter().any(|l| l.contains("body")));
    }
}
