use repopulse_api::GitHubClient;
use repopulse_core::{providers::GitHubProvider, Lifespan, TrafficStore};

/// Everything a command needs, passed explicitly instead of living in globals
pub struct Session {
    username: Option<String>,
    lifespan: Lifespan,
    provider: GitHubProvider,
    store: TrafficStore,
}

impl Session {
    pub fn new(
        username: Option<String>,
        lifespan: Lifespan,
        provider: GitHubProvider,
        store: TrafficStore,
    ) -> Self {
        Self {
            username,
            lifespan,
            provider,
            store,
        }
    }

    /// The user a command names, or the session's own user
    pub fn resolve_user(&self, user: Option<String>) -> anyhow::Result<String> {
        user.or_else(|| self.username.clone()).ok_or_else(|| {
            anyhow::anyhow!("No user given and no default username configured (use --user)")
        })
    }

    pub fn lifespan(&self) -> Lifespan {
        self.lifespan
    }

    pub fn client(&self) -> &GitHubClient {
        self.provider.client()
    }

    pub fn provider(&self) -> &GitHubProvider {
        &self.provider
    }

    pub fn store(&self) -> &TrafficStore {
        &self.store
    }
}
