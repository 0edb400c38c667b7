//! Target repository coordinates and credential, validated once at startup.

use crate::client::GitHubError;

/// Default GitHub REST API base URL.
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Configuration for the GitHub client.
///
/// Constructed once at process startup and injected into
/// [`crate::GitHubClient`]; nothing reads the environment after that point,
/// so a missing credential fails the process before any remote call is made.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token sent as a Bearer credential.
    pub token: String,
    /// API base URL. Overridable for GitHub Enterprise or test servers.
    pub api_url: String,
}

impl GitHubConfig {
    /// Build a configuration, rejecting empty coordinates or credential.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        let config = Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var          | Required | Default                  |
    /// |------------------|----------|--------------------------|
    /// | `GITHUB_OWNER`   | **yes**  | --                       |
    /// | `GITHUB_REPO`    | **yes**  | --                       |
    /// | `GITHUB_TOKEN`   | **yes**  | --                       |
    /// | `GITHUB_API_URL` | no       | `https://api.github.com` |
    pub fn from_env() -> Result<Self, GitHubError> {
        let owner = require_env("GITHUB_OWNER")?;
        let repo = require_env("GITHUB_REPO")?;
        let token = require_env("GITHUB_TOKEN")?;
        let api_url =
            std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let config = Self {
            owner,
            repo,
            token,
            api_url,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), GitHubError> {
        for (name, value) in [
            ("repository owner", &self.owner),
            ("repository name", &self.repo),
            ("access token", &self.token),
            ("API base URL", &self.api_url),
        ] {
            if value.trim().is_empty() {
                return Err(GitHubError::Configuration(format!(
                    "{name} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

fn require_env(name: &str) -> Result<String, GitHubError> {
    std::env::var(name)
        .map_err(|_| GitHubError::Configuration(format!("{name} must be set in the environment")))
}
