// Provider implementations for different platforms
pub mod github;

pub use github::GitHubProvider;
