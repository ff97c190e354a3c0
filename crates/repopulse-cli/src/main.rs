use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repopulse_api::GitHubClient;
use repopulse_core::{providers::GitHubProvider, time, Config, ReportOptions, Reporter, TrafficStore};

mod commands;
mod display;
mod repl;
mod session;

use session::Session;

#[derive(Parser)]
#[command(name = "repopulse")]
#[command(version, about = "Browse GitHub from the terminal and rank your repositories by activity", long_about = None)]
struct Cli {
    /// Your GitHub username
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Personal access token (traffic needs push access)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Weeks since the last push for a fork to still count as alive
    #[arg(short, long)]
    lifespan: Option<u32>,

    /// Traffic ledger file
    #[arg(long)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Interactive prompt (the default)
    Repl,
    /// Rank your repositories by alive forks, stars, clones and views
    Report {
        /// Judge liveness as of this time instead of now (RFC 3339)
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<DateTime<Utc>>,
    },
    /// Refresh the traffic ledger for one repository and print its totals
    Traffic {
        /// Repository name (owner/repo)
        repo: String,
    },
    /// Print the effective configuration
    Config,
}

fn parse_as_of(raw: &str) -> Result<DateTime<Utc>, String> {
    time::parse_timestamp(raw).map_err(|e| e.to_string())
}

/// Config file, then env, then flags
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load().context("Could not load configuration")?;

    if let Some(ref user) = cli.user {
        config.github.username = Some(user.clone());
    }
    if let Some(ref token) = cli.token {
        config.github.token = Some(token.clone());
    }
    if let Some(weeks) = cli.lifespan {
        config.report.lifespan_weeks = weeks;
    }
    if let Some(ref ledger) = cli.ledger {
        config.report.ledger_path = ledger.clone();
    }

    config.validate()?;
    Ok(config)
}

fn build_session(config: &Config) -> anyhow::Result<Session> {
    let client = GitHubClient::with_base_url(config.github.token.clone(), config.github.api_url.clone())
        .context("Could not build HTTP client")?
        .with_page_limit(config.report.page_limit);

    let store = TrafficStore::new(config.report.ledger_path.clone())
        .with_window_days(config.report.traffic_window_days);

    Ok(Session::new(
        config.github.username.clone(),
        config.lifespan(),
        GitHubProvider::new(client),
        store,
    ))
}

// One request in flight at a time, so a single thread is all we need
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "repopulse=info,repopulse_cli=info,repopulse_core=info,repopulse_api=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        None | Some(Commands::Repl) => {
            let session = build_session(&config)?;
            repl::run(&session).await?;
        }
        Some(Commands::Report { as_of }) => {
            let session = build_session(&config)?;
            let user = session.resolve_user(None)?;
            let mut options = ReportOptions::new(user, session.lifespan());
            if let Some(now) = as_of {
                options = options.as_of(now);
            }

            let entries = commands::run_report(&session, options).await?;
            commands::print_report(&entries);
        }
        Some(Commands::Traffic { repo }) => {
            let session = build_session(&config)?;
            let reporter = Reporter::new(session.provider(), session.store());
            let totals = reporter.refresh_traffic(&repo).await?;
            println!("{}: clones={} views={}", repo, totals.clones, totals.views);
        }
        Some(Commands::Config) => {
            println!("# {}", Config::config_path()?.display());
            print!("{}", config.to_redacted_toml()?);
        }
    }

    Ok(())
}
