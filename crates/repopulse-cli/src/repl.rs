// Read-eval-print loop: command registry, parsing, and the loop itself
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::error;

use crate::commands;
use crate::session::Session;

/// A parsed REPL command. Optional users fall back to the session user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    Repos { user: Option<String> },
    Stars { user: Option<String> },
    Watching { user: Option<String> },
    Profile { user: Option<String> },
    Gists { user: Option<String> },
    ShowRepo { repo: String, user: Option<String> },
    ShowReadme { repo: String, user: Option<String> },
    SearchIssues { term: String },
    SearchRepos { term: String },
    SearchUsers { term: String },
    Report { user: Option<String> },
}

/// Registry entry: what a command is called, what it takes, what it does
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub summary: &'static str,
}

impl CommandSpec {
    pub fn usage(&self) -> String {
        let mut usage = self.name.to_string();
        for param in self.required {
            usage.push_str(&format!(" <{}>", param));
        }
        for param in self.optional {
            usage.push_str(&format!(" [{}]", param));
        }
        usage
    }

    fn accepts(&self, count: usize) -> bool {
        count >= self.required.len() && count <= self.required.len() + self.optional.len()
    }
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: "exit", required: &[], optional: &[], summary: "Leave the REPL" },
    CommandSpec { name: "help", required: &[], optional: &[], summary: "Show this list" },
    CommandSpec { name: "repos", required: &[], optional: &["user"], summary: "List repositories" },
    CommandSpec { name: "stars", required: &[], optional: &["user"], summary: "List starred repositories" },
    CommandSpec { name: "watching", required: &[], optional: &["user"], summary: "List watched repositories" },
    CommandSpec { name: "profile", required: &[], optional: &["user"], summary: "Show profile info" },
    CommandSpec { name: "gists", required: &[], optional: &["user"], summary: "List gists" },
    CommandSpec { name: "showrepo", required: &["repo"], optional: &["user"], summary: "Show a repository and the start of its README" },
    CommandSpec { name: "showreadme", required: &["repo"], optional: &["user"], summary: "Show a repository's README" },
    CommandSpec { name: "searchissues", required: &["term"], optional: &[], summary: "Search issues" },
    CommandSpec { name: "searchrepos", required: &["term"], optional: &[], summary: "Search repositories" },
    CommandSpec { name: "searchusers", required: &["term"], optional: &[], summary: "Search users" },
    CommandSpec { name: "report", required: &[], optional: &["user"], summary: "Rank repositories by alive forks, stars, clones and views" },
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("{name} is not a command{}", .suggestion.map(|s| format!(". Did you mean '{}'?", s)).unwrap_or_default())]
    Unknown {
        name: String,
        suggestion: Option<&'static str>,
    },

    #[error("{name} takes {expected}, got {given} argument(s). Usage: {usage}")]
    WrongArgs {
        name: &'static str,
        expected: String,
        given: usize,
        usage: String,
    },
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let name = name.to_lowercase();
        let args: Vec<String> = words.map(str::to_string).collect();

        let spec = lookup(&name).ok_or_else(|| CommandError::Unknown {
            suggestion: suggest(&name),
            name: name.clone(),
        })?;

        if !spec.accepts(args.len()) {
            return Err(CommandError::WrongArgs {
                name: spec.name,
                expected: expected_args(spec),
                given: args.len(),
                usage: spec.usage(),
            });
        }

        let mut args = args.into_iter();
        let mut next = || args.next();

        let command = match spec.name {
            "exit" => Command::Exit,
            "help" => Command::Help,
            "repos" => Command::Repos { user: next() },
            "stars" => Command::Stars { user: next() },
            "watching" => Command::Watching { user: next() },
            "profile" => Command::Profile { user: next() },
            "gists" => Command::Gists { user: next() },
            "showrepo" => Command::ShowRepo { repo: next().unwrap_or_default(), user: next() },
            "showreadme" => Command::ShowReadme { repo: next().unwrap_or_default(), user: next() },
            "searchissues" => Command::SearchIssues { term: next().unwrap_or_default() },
            "searchrepos" => Command::SearchRepos { term: next().unwrap_or_default() },
            "searchusers" => Command::SearchUsers { term: next().unwrap_or_default() },
            "report" => Command::Report { user: next() },
            other => {
                return Err(CommandError::Unknown {
                    name: other.to_string(),
                    suggestion: None,
                })
            }
        };

        Ok(Some(command))
    }
}

fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

fn expected_args(spec: &CommandSpec) -> String {
    let min = spec.required.len();
    let max = min + spec.optional.len();
    if min == max {
        format!("{} argument(s)", min)
    } else {
        format!("{} to {} arguments", min, max)
    }
}

/// Closest command name by fuzzy match, if anything matches at all
fn suggest(name: &str) -> Option<&'static str> {
    let matcher = SkimMatcherV2::default();
    COMMANDS
        .iter()
        .filter_map(|spec| matcher.fuzzy_match(spec.name, name).map(|score| (score, spec.name)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, name)| name)
}

/// Command list for `help`
pub fn help_text() -> String {
    let mut text = String::from("Most of the time the 'user' argument can be omitted\nCommands:\n");
    for spec in COMMANDS {
        text.push_str(&format!("- {} : {}\n", spec.usage(), spec.summary));
    }
    text
}

/// Prompt, parse, run, repeat until `exit` or end of input.
///
/// Bad input and failed commands are logged and the loop carries on.
pub async fn run(session: &Session) -> anyhow::Result<()> {
    print!("{}", help_text());

    loop {
        print!(">");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Exit)) => return Ok(()),
            Ok(Some(command)) => {
                if let Err(e) = commands::execute(session, command).await {
                    error!("{:#}", e);
                }
            }
            Err(e) => error!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_is_ignored() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("   \n"), Ok(None));
    }

    #[test]
    fn test_parse_optional_user() {
        assert_eq!(Command::parse("repos"), Ok(Some(Command::Repos { user: None })));
        assert_eq!(
            Command::parse("repos torvalds\n"),
            Ok(Some(Command::Repos { user: Some("torvalds".into()) }))
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            Command::parse("ShowRepo tool octo"),
            Ok(Some(Command::ShowRepo {
                repo: "tool".into(),
                user: Some("octo".into())
            }))
        );
        assert_eq!(Command::parse("EXIT"), Ok(Some(Command::Exit)));
    }

    #[test]
    fn test_required_argument_missing() {
        let err = Command::parse("searchrepos").unwrap_err();
        assert!(matches!(err, CommandError::WrongArgs { name: "searchrepos", given: 0, .. }));
        assert!(err.to_string().contains("searchrepos <term>"));
    }

    #[test]
    fn test_too_many_arguments() {
        let err = Command::parse("profile a b").unwrap_err();
        assert!(matches!(err, CommandError::WrongArgs { given: 2, .. }));
    }

    #[test]
    fn test_unknown_command_suggests() {
        let err = Command::parse("showread tool").unwrap_err();
        assert_eq!(
            err,
            CommandError::Unknown {
                name: "showread".into(),
                suggestion: Some("showreadme")
            }
        );
        assert!(err.to_string().contains("Did you mean 'showreadme'?"));
    }

    #[test]
    fn test_unknown_command_without_match() {
        let err = Command::parse("zzzz").unwrap_err();
        assert_eq!(err.to_string(), "zzzz is not a command");
    }

    #[test]
    fn test_every_registered_command_parses() {
        for spec in COMMANDS {
            let line = std::iter::once(spec.name)
                .chain(spec.required.iter().map(|_| "x"))
                .collect::<Vec<_>>()
                .join(" ");
            assert!(
                matches!(Command::parse(&line), Ok(Some(_))),
                "{} did not parse",
                spec.name
            );
        }
    }

    #[test]
    fn test_help_lists_everything() {
        let help = help_text();
        for spec in COMMANDS {
            assert!(help.contains(&spec.usage()));
        }
    }
}
