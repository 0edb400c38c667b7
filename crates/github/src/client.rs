//! REST client for the GitHub endpoints the change orchestrator uses.
//!
//! Wraps repository metadata, git refs, file contents, and pull request
//! creation using [`reqwest`]. Every call shares one HTTP client with a
//! 30-second timeout; a timed-out call surfaces as [`GitHubError::Request`].

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::GitHubConfig;

/// Bounded wait applied to every remote call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the GitHub client layer.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    /// Repository coordinates or credential are absent or malformed.
    /// Raised before any remote call.
    #[error("GitHub configuration error: {0}")]
    Configuration(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// GitHub returned a non-2xx status code.
    #[error("GitHub API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging. Logged, never returned to API
        /// callers.
        body: String,
    },
}

/// Repository metadata. Only the default branch is needed.
#[derive(Debug, Deserialize)]
pub struct Repository {
    pub default_branch: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct FileContent {
    sha: String,
}

/// A created pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: i64,
    pub html_url: String,
}

/// The remote operations the change orchestrator depends on.
///
/// [`GitHubClient`] is the production implementation; tests substitute a
/// stub host that records calls instead of touching the network.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Fetch repository metadata (to discover the default branch).
    async fn repository(&self) -> Result<Repository, GitHubError>;

    /// Resolve the commit SHA at the head of a branch.
    async fn branch_head(&self, branch: &str) -> Result<String, GitHubError>;

    /// Create a new branch reference pointing at `sha`.
    async fn create_branch(&self, branch: &str, sha: &str) -> Result<(), GitHubError>;

    /// Read the content hash of a file at `path` on `reference`.
    ///
    /// Returns `Ok(None)` when the path does not exist there -- the caller
    /// treats that as "write a brand-new file", not as an error.
    async fn file_sha(&self, path: &str, reference: &str) -> Result<Option<String>, GitHubError>;

    /// Create or update a file on `branch`.
    ///
    /// Pass the previously observed `sha` when updating an existing file so
    /// the remote rejects the write if the file changed since it was read.
    async fn put_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> Result<(), GitHubError>;

    /// Open a pull request from `head` into `base`.
    async fn open_pull_request(
        &self,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<PullRequest, GitHubError>;
}

/// HTTP client for a single GitHub repository.
pub struct GitHubClient {
    client: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Create a client from validated configuration.
    pub fn new(config: GitHubConfig) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| GitHubError::Configuration("access token is not valid ASCII".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = reqwest::Client::builder()
            .user_agent(concat!("boardroom/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build a URL under `/repos/{owner}/{repo}`.
    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.config.api_url, self.config.owner, self.config.repo, tail
        )
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`GitHubError::Api`] containing the status
    /// and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GitHubError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GitHubError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), GitHubError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn repository(&self) -> Result<Repository, GitHubError> {
        let response = self.client.get(self.repo_url("")).send().await?;
        Self::parse_response(response).await
    }

    async fn branch_head(&self, branch: &str) -> Result<String, GitHubError> {
        let url = self.repo_url(&format!("/git/ref/heads/{branch}"));
        let response = self.client.get(url).send().await?;
        let git_ref: GitRef = Self::parse_response(response).await?;
        Ok(git_ref.object.sha)
    }

    async fn create_branch(&self, branch: &str, sha: &str) -> Result<(), GitHubError> {
        let body = serde_json::json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": sha,
        });
        let response = self
            .client
            .post(self.repo_url("/git/refs"))
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn file_sha(&self, path: &str, reference: &str) -> Result<Option<String>, GitHubError> {
        let url = self.repo_url(&format!("/contents/{path}"));
        let response = self
            .client
            .get(url)
            .query(&[("ref", reference)])
            .send()
            .await?;

        // Missing path is an expected branch of normal logic: the file will
        // be created rather than updated.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let file: FileContent = Self::parse_response(response).await?;
        Ok(Some(file.sha))
    }

    async fn put_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> Result<(), GitHubError> {
        let mut body = serde_json::json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
            "branch": branch,
        });
        if let Some(sha) = sha {
            body["sha"] = serde_json::Value::String(sha.to_string());
        }

        let url = self.repo_url(&format!("/contents/{path}"));
        let response = self.client.put(url).json(&body).send().await?;
        Self::check_status(response).await
    }

    async fn open_pull_request(
        &self,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<PullRequest, GitHubError> {
        let payload = serde_json::json!({
            "title": title,
            "head": head,
            "base": base,
            "body": body,
        });
        let response = self
            .client
            .post(self.repo_url("/pulls"))
            .json(&payload)
            .send()
            .await?;
        Self::parse_response(response).await
    }
}
