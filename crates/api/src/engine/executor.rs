//! Remote change orchestration for an approved idea.
//!
//! The executor drives the [`RepoHost`] through a strictly sequential
//! pipeline: discover the default branch, capture its head SHA, create a
//! fresh work branch, write each file (with optimistic-concurrency SHAs for
//! files that already exist), and open a pull request. Each step depends on
//! the previous one succeeding; the first failure aborts the run.
//!
//! The executor never touches the idea store. The claim/record/release
//! protocol around a run belongs to the execute handler, which keeps this
//! type fully testable against a stub host. There is no rollback: a branch
//! or files created before a failing step stay on the remote (logged at
//! WARN so operators can find the orphan).

use boardroom_core::idea::{execution_branch_name, FileChange};
use boardroom_db::models::idea::Idea;
use boardroom_github::{GitHubError, RepoHost};

/// Result of a successful orchestration run.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// The branch created for this attempt.
    pub branch_name: String,
    /// Number of the opened pull request.
    pub pr_number: i64,
    /// Browser URL of the opened pull request.
    pub pr_url: String,
}

/// Drives the remote branch-create / commit / pull-request sequence.
pub struct ChangeExecutor<'a, R: RepoHost> {
    host: &'a R,
}

impl<'a, R: RepoHost> ChangeExecutor<'a, R> {
    pub fn new(host: &'a R) -> Self {
        Self { host }
    }

    /// Execute the idea's file changes against the remote repository.
    ///
    /// The caller must already hold the `executing` claim on the idea. On
    /// failure the remote may retain a partially populated branch; the
    /// caller is responsible for releasing the claim.
    pub async fn run(
        &self,
        idea: &Idea,
        files: &[FileChange],
        message: Option<&str>,
    ) -> Result<ExecutionOutcome, GitHubError> {
        // 1. Discover the integration branch.
        let repo = self.host.repository().await?;

        // 2. Capture its current head.
        let base_sha = self.host.branch_head(&repo.default_branch).await?;

        // 3. Create a fresh branch for this attempt. The suffix is drawn
        //    per attempt so retries after a failure cannot collide with a
        //    branch the earlier attempt left behind.
        let branch_name = execution_branch_name(idea.id);
        self.host.create_branch(&branch_name, &base_sha).await?;
        tracing::info!(
            idea_id = idea.id,
            branch = %branch_name,
            base_sha = %base_sha,
            "Created execution branch"
        );

        // 4. Write each file. An existing file is updated with its observed
        //    content SHA so the remote rejects writes over versions we never
        //    read; a missing file is created without one.
        let default_message;
        let commit_message = match message {
            Some(m) if !m.trim().is_empty() => m,
            _ => {
                default_message = format!("Implement idea: {}", idea.title);
                &default_message
            }
        };

        for file in files {
            let result = self.write_file(file, commit_message, &branch_name).await;
            if let Err(err) = result {
                tracing::warn!(
                    idea_id = idea.id,
                    branch = %branch_name,
                    path = %file.path,
                    "File write failed; branch left on remote"
                );
                return Err(err);
            }
        }

        // 5. Open the pull request into the default branch.
        let pr_title = format!("Idea #{}: {}", idea.id, idea.title);
        let pr_body = format!(
            "Automated change for idea #{}.\n\n{}\n\n**Admin approval required before merge.**",
            idea.id, idea.description
        );
        let pr = match self
            .host
            .open_pull_request(&pr_title, &branch_name, &repo.default_branch, &pr_body)
            .await
        {
            Ok(pr) => pr,
            Err(err) => {
                tracing::warn!(
                    idea_id = idea.id,
                    branch = %branch_name,
                    "Pull request creation failed; branch left on remote"
                );
                return Err(err);
            }
        };

        tracing::info!(
            idea_id = idea.id,
            branch = %branch_name,
            pr_number = pr.number,
            "Opened pull request"
        );

        Ok(ExecutionOutcome {
            branch_name,
            pr_number: pr.number,
            pr_url: pr.html_url,
        })
    }

    async fn write_file(
        &self,
        file: &FileChange,
        message: &str,
        branch: &str,
    ) -> Result<(), GitHubError> {
        let existing_sha = self.host.file_sha(&file.path, branch).await?;
        self.host
            .put_file(
                &file.path,
                message,
                &file.content,
                branch,
                existing_sha.as_deref(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use boardroom_github::{PullRequest, Repository};
    use chrono::Utc;

    use super::*;

    /// Which remote step a [`StubHost`] should fail at, if any.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum FailAt {
        Nothing,
        Repository,
        BranchHead,
        CreateBranch,
        PutFile,
        PullRequest,
    }

    /// One recorded call against the stub host.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Repository,
        BranchHead(String),
        CreateBranch { branch: String, sha: String },
        FileSha { path: String, reference: String },
        PutFile {
            path: String,
            message: String,
            branch: String,
            sha: Option<String>,
        },
        PullRequest { head: String, base: String, title: String, body: String },
    }

    /// In-memory repository host that records every call.
    struct StubHost {
        calls: Mutex<Vec<Call>>,
        /// Paths that "already exist" on the remote, mapped to their SHA.
        existing_files: HashMap<String, String>,
        fail_at: FailAt,
    }

    impl StubHost {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                existing_files: HashMap::new(),
                fail_at: FailAt::Nothing,
            }
        }

        fn failing_at(fail_at: FailAt) -> Self {
            Self {
                fail_at,
                ..Self::new()
            }
        }

        fn with_existing_file(mut self, path: &str, sha: &str) -> Self {
            self.existing_files.insert(path.into(), sha.into());
            self
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn upstream_error() -> GitHubError {
            GitHubError::Api {
                status: 502,
                body: "stubbed failure".into(),
            }
        }
    }

    #[async_trait]
    impl RepoHost for StubHost {
        async fn repository(&self) -> Result<Repository, GitHubError> {
            self.record(Call::Repository);
            if self.fail_at == FailAt::Repository {
                return Err(Self::upstream_error());
            }
            Ok(Repository {
                default_branch: "main".into(),
            })
        }

        async fn branch_head(&self, branch: &str) -> Result<String, GitHubError> {
            self.record(Call::BranchHead(branch.into()));
            if self.fail_at == FailAt::BranchHead {
                return Err(Self::upstream_error());
            }
            Ok("abc123def456".into())
        }

        async fn create_branch(&self, branch: &str, sha: &str) -> Result<(), GitHubError> {
            self.record(Call::CreateBranch {
                branch: branch.into(),
                sha: sha.into(),
            });
            if self.fail_at == FailAt::CreateBranch {
                return Err(Self::upstream_error());
            }
            Ok(())
        }

        async fn file_sha(
            &self,
            path: &str,
            reference: &str,
        ) -> Result<Option<String>, GitHubError> {
            self.record(Call::FileSha {
                path: path.into(),
                reference: reference.into(),
            });
            Ok(self.existing_files.get(path).cloned())
        }

        async fn put_file(
            &self,
            path: &str,
            message: &str,
            _content: &str,
            branch: &str,
            sha: Option<&str>,
        ) -> Result<(), GitHubError> {
            self.record(Call::PutFile {
                path: path.into(),
                message: message.into(),
                branch: branch.into(),
                sha: sha.map(String::from),
            });
            if self.fail_at == FailAt::PutFile {
                return Err(Self::upstream_error());
            }
            Ok(())
        }

        async fn open_pull_request(
            &self,
            title: &str,
            head: &str,
            base: &str,
            body: &str,
        ) -> Result<PullRequest, GitHubError> {
            self.record(Call::PullRequest {
                head: head.into(),
                base: base.into(),
                title: title.into(),
                body: body.into(),
            });
            if self.fail_at == FailAt::PullRequest {
                return Err(Self::upstream_error());
            }
            Ok(PullRequest {
                number: 77,
                html_url: "https://github.com/acme/widgets/pull/77".into(),
            })
        }
    }

    fn approved_idea() -> Idea {
        Idea {
            id: 9,
            title: "Add health check".into(),
            description: "Expose a /health route".into(),
            created_by: "ceo@boardroom.local".into(),
            status: "executing".into(),
            branch_name: None,
            pr_number: None,
            created_at: Utc::now(),
        }
    }

    fn one_file() -> Vec<FileChange> {
        vec![FileChange {
            path: "a.txt".into(),
            content: "hi".into(),
        }]
    }

    #[tokio::test]
    async fn test_successful_run_creates_branch_and_pr() {
        let host = StubHost::new();
        let executor = ChangeExecutor::new(&host);

        let outcome = executor
            .run(&approved_idea(), &one_file(), None)
            .await
            .expect("run should succeed");

        assert_eq!(outcome.pr_number, 77);
        assert_eq!(outcome.pr_url, "https://github.com/acme/widgets/pull/77");

        let suffix = outcome
            .branch_name
            .strip_prefix("agent/9-")
            .expect("branch should be named agent/<id>-<suffix>");
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));

        // The sequence is strictly ordered: repo -> head -> branch ->
        // (read, write) per file -> PR.
        let calls = host.calls();
        assert_eq!(calls[0], Call::Repository);
        assert_eq!(calls[1], Call::BranchHead("main".into()));
        assert_eq!(
            calls[2],
            Call::CreateBranch {
                branch: outcome.branch_name.clone(),
                sha: "abc123def456".into(),
            }
        );
        assert!(matches!(calls[3], Call::FileSha { .. }));
        assert!(matches!(calls[4], Call::PutFile { .. }));
        match &calls[5] {
            Call::PullRequest { head, base, title, body } => {
                assert_eq!(head, &outcome.branch_name);
                assert_eq!(base, "main");
                assert!(title.contains("Add health check"));
                assert!(body.contains("idea #9"));
                assert!(body.contains("Expose a /health route"));
                assert!(body.contains("Admin approval required before merge"));
            }
            other => panic!("expected pull request call, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_existing_file_write_carries_observed_sha() {
        let host = StubHost::new().with_existing_file("a.txt", "feedbeef");
        let executor = ChangeExecutor::new(&host);

        executor
            .run(&approved_idea(), &one_file(), None)
            .await
            .expect("run should succeed");

        let put = host
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::PutFile { sha, .. } => Some(sha),
                _ => None,
            })
            .expect("a file should have been written");
        assert_eq!(put, Some("feedbeef".to_string()));
    }

    #[tokio::test]
    async fn test_new_file_write_omits_sha() {
        let host = StubHost::new();
        let executor = ChangeExecutor::new(&host);

        executor
            .run(&approved_idea(), &one_file(), None)
            .await
            .expect("run should succeed");

        let put = host
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::PutFile { sha, .. } => Some(sha),
                _ => None,
            })
            .expect("a file should have been written");
        assert_eq!(put, None);
    }

    #[tokio::test]
    async fn test_branch_creation_failure_stops_before_writes() {
        let host = StubHost::failing_at(FailAt::CreateBranch);
        let executor = ChangeExecutor::new(&host);

        let err = executor
            .run(&approved_idea(), &one_file(), None)
            .await
            .expect_err("run should fail");
        assert_matches!(err, GitHubError::Api { status: 502, .. });

        // No file writes, no PR -- the sequence aborted at step 3.
        let calls = host.calls();
        assert!(calls
            .iter()
            .all(|c| !matches!(c, Call::PutFile { .. } | Call::PullRequest { .. })));
    }

    #[tokio::test]
    async fn test_file_write_failure_stops_before_pull_request() {
        let host = StubHost::failing_at(FailAt::PutFile);
        let executor = ChangeExecutor::new(&host);

        let err = executor
            .run(&approved_idea(), &one_file(), None)
            .await
            .expect_err("run should fail");
        assert_matches!(err, GitHubError::Api { .. });

        let calls = host.calls();
        assert!(calls
            .iter()
            .all(|c| !matches!(c, Call::PullRequest { .. })));
    }

    #[tokio::test]
    async fn test_retry_after_failure_uses_a_fresh_branch_name() {
        let failing = StubHost::failing_at(FailAt::PutFile);
        let executor = ChangeExecutor::new(&failing);
        executor
            .run(&approved_idea(), &one_file(), None)
            .await
            .expect_err("first attempt should fail");

        let first_branch = failing
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::CreateBranch { branch, .. } => Some(branch),
                _ => None,
            })
            .expect("first attempt should have created a branch");

        let healthy = StubHost::new();
        let executor = ChangeExecutor::new(&healthy);
        let outcome = executor
            .run(&approved_idea(), &one_file(), None)
            .await
            .expect("retry should succeed");

        assert_ne!(
            outcome.branch_name, first_branch,
            "retry must not reuse the failed attempt's branch"
        );
    }

    #[tokio::test]
    async fn test_default_commit_message_references_idea_title() {
        let host = StubHost::new();
        let executor = ChangeExecutor::new(&host);

        executor
            .run(&approved_idea(), &one_file(), None)
            .await
            .expect("run should succeed");

        let message = host
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::PutFile { message, .. } => Some(message),
                _ => None,
            })
            .expect("a file should have been written");
        assert!(message.contains("Add health check"));
    }

    #[tokio::test]
    async fn test_explicit_commit_message_is_used_verbatim() {
        let host = StubHost::new();
        let executor = ChangeExecutor::new(&host);

        executor
            .run(&approved_idea(), &one_file(), Some("wire up /health"))
            .await
            .expect("run should succeed");

        let message = host
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::PutFile { message, .. } => Some(message),
                _ => None,
            })
            .expect("a file should have been written");
        assert_eq!(message, "wire up /health");
    }

    #[tokio::test]
    async fn test_multiple_files_each_get_their_own_read_and_write() {
        let host = StubHost::new().with_existing_file("README.md", "0ldsha");
        let executor = ChangeExecutor::new(&host);

        let files = vec![
            FileChange {
                path: "README.md".into(),
                content: "updated".into(),
            },
            FileChange {
                path: "docs/new.md".into(),
                content: "fresh".into(),
            },
        ];

        executor
            .run(&approved_idea(), &files, None)
            .await
            .expect("run should succeed");

        let puts: Vec<(String, Option<String>)> = host
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::PutFile { path, sha, .. } => Some((path, sha)),
                _ => None,
            })
            .collect();

        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0], ("README.md".into(), Some("0ldsha".into())));
        assert_eq!(puts[1], ("docs/new.md".into(), None));
    }
}
