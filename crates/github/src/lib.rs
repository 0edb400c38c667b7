//! GitHub API client for the boardroom change pipeline.
//!
//! [`client::GitHubClient`] wraps the handful of GitHub REST endpoints the
//! change orchestrator needs: repository metadata, git refs, file contents,
//! and pull requests. The [`client::RepoHost`] trait is the seam the
//! orchestrator is written against, so tests can drive it with a stub host
//! instead of the network.

pub mod client;
pub mod config;

pub use client::{GitHubClient, GitHubError, PullRequest, RepoHost, Repository};
pub use config::GitHubConfig;
