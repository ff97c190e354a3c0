// What each REPL command actually does
use anyhow::Context;
use repopulse_api::UserListing;
use repopulse_core::{ReportOptions, Reporter, ScoreEntry};
use std::io;

use crate::display::{self, Pager};
use crate::repl::{self, Command};
use crate::session::Session;

// items per screen
const REPOS_PER_PAGE: usize = 8;
const SEARCH_REPOS_PER_PAGE: usize = 10;
const LIST_PER_PAGE: usize = 30;
const MARKDOWN_LINES_PER_PAGE: usize = 30;

fn pager() -> Pager<io::StdinLock<'static>, io::Stdout> {
    Pager::new(io::stdin().lock(), io::stdout())
}

pub async fn execute(session: &Session, command: Command) -> anyhow::Result<()> {
    match command {
        // handled by the loop
        Command::Exit => {}
        Command::Help => {
            display::clear_screen()?;
            print!("{}", repl::help_text());
        }
        Command::Repos { user } => list_repos(session, user, UserListing::Repos).await?,
        Command::Stars { user } => list_repos(session, user, UserListing::Starred).await?,
        Command::Watching { user } => list_repos(session, user, UserListing::Subscriptions).await?,
        Command::Profile { user } => {
            let user = session.resolve_user(user)?;
            let profile = session.client().get_user(&user).await?;
            display::clear_screen()?;
            println!("{}", display::format_profile(&profile));
        }
        Command::Gists { user } => {
            let user = session.resolve_user(user)?;
            let gists = session.client().list_user_gists(&user).await?;
            pager().show(&gists, LIST_PER_PAGE, 0, display::format_gist)?;
        }
        Command::ShowRepo { repo, user } => {
            let full_name = format!("{}/{}", session.resolve_user(user)?, repo);
            let readme = session.client().get_readme(&full_name).await?;
            let details = session.client().get_repo(&full_name).await?;

            display::clear_screen()?;
            println!("{}", display::format_repo(&details));
            println!("README");
            pager().show(&display::render_markdown(&readme), MARKDOWN_LINES_PER_PAGE, 1, String::clone)?;
        }
        Command::ShowReadme { repo, user } => {
            let full_name = format!("{}/{}", session.resolve_user(user)?, repo);
            let readme = session.client().get_readme(&full_name).await?;

            display::clear_screen()?;
            pager().show(&display::render_markdown(&readme), MARKDOWN_LINES_PER_PAGE, 0, String::clone)?;
        }
        Command::SearchIssues { term } => {
            let issues = session.client().search_issues(&term).await?;
            pager().show(&issues, LIST_PER_PAGE, 0, display::format_issue)?;
        }
        Command::SearchRepos { term } => {
            let repos = session.client().search_repositories(&term).await?;
            pager().show(&repos, SEARCH_REPOS_PER_PAGE, 0, display::format_repo)?;
        }
        Command::SearchUsers { term } => {
            let users = session.client().search_users(&term).await?;
            pager().show(&users, LIST_PER_PAGE, 0, display::format_user)?;
        }
        Command::Report { user } => {
            let user = session.resolve_user(user)?;
            let entries = report(session, &user).await?;
            print_report(&entries);
        }
    }

    Ok(())
}

async fn list_repos(session: &Session, user: Option<String>, listing: UserListing) -> anyhow::Result<()> {
    let user = session.resolve_user(user)?;
    let repos = session.client().list_user_repos(&user, listing).await?;
    pager().show(&repos, REPOS_PER_PAGE, 0, display::format_repo)?;
    Ok(())
}

/// Score and rank every repository `user` owns
pub async fn report(session: &Session, user: &str) -> anyhow::Result<Vec<ScoreEntry>> {
    let options = ReportOptions::new(user, session.lifespan());
    run_report(session, options).await
}

pub async fn run_report(session: &Session, options: ReportOptions) -> anyhow::Result<Vec<ScoreEntry>> {
    let reporter = Reporter::new(session.provider(), session.store());
    reporter
        .run(&options)
        .await
        .with_context(|| format!("Report for {} failed", options.user))
}

pub fn print_report(entries: &[ScoreEntry]) {
    for entry in entries {
        println!("{}", entry);
    }
}
