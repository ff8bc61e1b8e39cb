use std::sync::Arc;
use std::time::Duration;

use crate::ai;
use crate::error::{HostError, PassError};
use crate::host::{
    BranchPush, CreatedPullRequest, FileEdit, NewCommentThread, NewPullRequest, PullRequestInfo,
    RepoHost,
};
use crate::llm::ModelClient;
use crate::types::{
    FileCorrection, FileReport, PassOutcome, PassSummary, ReviewRequest, SkipReason,
};

/// Marker prefixed to every posted comment; its presence in any existing
/// thread means the PR was already reviewed.
pub const AI_REVIEW_MARKER: &str = "[AI Review]";

/// Title prefix of automation-created fix PRs.
pub const AI_FIX_TITLE_PREFIX: &str = "[AI Suggested Fixes]";

const AI_TITLE_PREFIX: &str = "ai:";

const FIX_COMMIT_MESSAGE: &str = "AI-suggested code improvements based on review guidelines";

/// True for titles the service must never review: explicitly AI-tagged PRs
/// and the service's own fix PRs. Keeps the webhook loop from feeding on
/// itself.
pub fn is_ai_authored_title(title: &str) -> bool {
    let trimmed = title.trim();
    trimmed.to_lowercase().starts_with(AI_TITLE_PREFIX) || trimmed.contains(AI_FIX_TITLE_PREFIX)
}

/// Runs one review pass: gates, per-file fan-out, correction publication.
pub struct PullRequestReviewer {
    host: Arc<dyn RepoHost>,
    model: Arc<dyn ModelClient>,
    guidelines: String,
    model_deadline: Duration,
    create_fix_pr: bool,
}

impl PullRequestReviewer {
    pub fn new(
        host: Arc<dyn RepoHost>,
        model: Arc<dyn ModelClient>,
        guidelines: String,
        model_deadline: Duration,
        create_fix_pr: bool,
    ) -> Self {
        Self {
            host,
            model,
            guidelines,
            model_deadline,
            create_fix_pr,
        }
    }

    pub async fn run(&self, request: &ReviewRequest) -> Result<PassOutcome, PassError> {
        let repos = self.host.list_repositories(&request.project).await?;
        let repo = repos
            .into_iter()
            .find(|r| r.name == request.repo_name)
            .ok_or_else(|| PassError::RepositoryNotFound(request.repo_name.clone()))?;

        let pr = self
            .host
            .get_pull_request(&repo.id, request.pull_request_id, &request.project)
            .await?;

        if pr.is_draft {
            tracing::info!(pr_id = pr.id, "skipping draft pull request");
            return Ok(PassOutcome::Skipped(SkipReason::DraftPullRequest));
        }

        if is_ai_authored_title(&pr.title) {
            tracing::info!(pr_id = pr.id, title = %pr.title, "skipping AI-generated PR");
            return Ok(PassOutcome::Skipped(SkipReason::AiAuthoredTitle));
        }

        if self
            .has_existing_review(&repo.id, pr.id, &request.project)
            .await
        {
            tracing::info!(pr_id = pr.id, "AI comments already exist for this PR, skipping");
            return Ok(PassOutcome::Skipped(SkipReason::AlreadyReviewed));
        }

        let iterations = self
            .host
            .list_iterations(&repo.id, pr.id, &request.project)
            .await?;
        let latest = iterations.last().ok_or(PassError::NoIterations)?;

        let changes = self
            .host
            .iteration_changes(&repo.id, pr.id, latest.id, &request.project)
            .await?;

        let tasks = changes
            .iter()
            .filter(|change| !change.is_folder)
            .map(|change| self.review_file(&repo.id, &pr, &request.project, &change.path));
        let reports: Vec<FileReport> = futures::future::join_all(tasks).await;

        let corrections: Vec<FileCorrection> = reports
            .iter()
            .filter_map(|report| report.correction.clone())
            .collect();

        let mut summary = PassSummary {
            files_reviewed: reports.len(),
            comments_posted: reports.iter().map(|r| r.comments_posted).sum(),
            corrections: corrections.len(),
            fix_pr_id: None,
        };

        if corrections.is_empty() {
            tracing::info!(pr_id = pr.id, "no AI-suggested changes to apply");
        } else if self.create_fix_pr {
            match self
                .publish_corrections(&repo.id, &pr, &request.project, &corrections)
                .await
            {
                Ok(created) => {
                    tracing::info!(fix_pr_id = created.id, "created new PR with AI-suggested fixes");
                    summary.fix_pr_id = Some(created.id);
                }
                Err(e) => {
                    tracing::error!(error = %e, "PR creation failed but comments were posted");
                }
            }
        }

        Ok(PassOutcome::Completed(summary))
    }

    /// Best-effort idempotency gate. A listing failure passes open: a
    /// duplicate review beats never reviewing because of a transient error.
    async fn has_existing_review(&self, repo_id: &str, pr_id: u64, project: &str) -> bool {
        match self.host.list_comment_threads(repo_id, pr_id, project).await {
            Ok(threads) => threads.iter().any(|thread| {
                thread
                    .comments
                    .iter()
                    .any(|comment| comment.content.contains(AI_REVIEW_MARKER))
            }),
            Err(e) => {
                tracing::warn!(error = %e, "thread listing failed, proceeding with review");
                false
            }
        }
    }

    /// Process one changed file end to end. Every failure is absorbed here
    /// so the other files' tasks keep running.
    async fn review_file(
        &self,
        repo_id: &str,
        pr: &PullRequestInfo,
        project: &str,
        path: &str,
    ) -> FileReport {
        let (old_content, new_content) = match tokio::try_join!(
            self.host
                .file_content(repo_id, path, branch_name(&pr.target_ref_name), project),
            self.host
                .file_content(repo_id, path, branch_name(&pr.source_ref_name), project),
        ) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(path, error = %e, "content fetch failed, skipping file");
                return FileReport::empty(path);
            }
        };

        tracing::info!(path, "generating comments");
        let outcome = ai::analyze_file(
            self.model.as_ref(),
            &self.guidelines,
            &old_content,
            &new_content,
            path,
            self.model_deadline,
        )
        .await;
        if let Some(error) = &outcome.analysis_error {
            tracing::warn!(path, error = %error, "analysis degraded to fallback");
        }
        tracing::info!(path, count = outcome.comments.len(), "generated comments");

        let mut comments_posted = 0;
        for comment in &outcome.comments {
            let thread = NewCommentThread {
                path: path.to_string(),
                line: comment.line_number,
                content: format!("{} {}", AI_REVIEW_MARKER, comment.text),
            };
            match self
                .host
                .create_comment_thread(repo_id, pr.id, project, thread)
                .await
            {
                Ok(()) => comments_posted += 1,
                Err(e) => {
                    tracing::warn!(path, line = comment.line_number, error = %e, "comment post failed");
                }
            }
        }

        let correction = (outcome.new_content != new_content
            && is_valid_correction(&outcome.new_content))
        .then(|| FileCorrection {
            path: path.to_string(),
            original_content: new_content,
            corrected_content: outcome.new_content,
        });

        FileReport {
            path: path.to_string(),
            comments_posted,
            correction,
        }
    }

    /// Branch from the current source tip, commit every correction as one
    /// changeset, and open the fix PR into the original target branch.
    async fn publish_corrections(
        &self,
        repo_id: &str,
        pr: &PullRequestInfo,
        project: &str,
        corrections: &[FileCorrection],
    ) -> Result<CreatedPullRequest, HostError> {
        let source_branch = branch_name(&pr.source_ref_name);
        let fix_branch_ref = format!(
            "refs/heads/ai-fix/{}-{}",
            source_branch,
            chrono::Utc::now().timestamp_millis()
        );

        let base_commit = self.host.branch_tip(repo_id, source_branch, project).await?;

        self.host
            .push_branch(
                repo_id,
                project,
                BranchPush {
                    branch_ref: fix_branch_ref.clone(),
                    from_commit: base_commit,
                    commit_message: FIX_COMMIT_MESSAGE.to_string(),
                    edits: corrections
                        .iter()
                        .map(|c| FileEdit {
                            path: c.path.clone(),
                            content: c.corrected_content.clone(),
                        })
                        .collect(),
                },
            )
            .await?;

        self.host
            .create_pull_request(
                repo_id,
                project,
                NewPullRequest {
                    title: format!("{} {}", AI_FIX_TITLE_PREFIX, pr.title),
                    description: format!(
                        "Automated code improvements based on review guidelines\n\nOriginal PR: {}",
                        pr.url
                    ),
                    source_ref_name: fix_branch_ref,
                    target_ref_name: pr.target_ref_name.clone(),
                },
            )
            .await
    }
}

fn branch_name(ref_name: &str) -> &str {
    ref_name.strip_prefix("refs/heads/").unwrap_or(ref_name)
}

/// Guard against the model returning an effectively empty file.
fn is_valid_correction(corrected: &str) -> bool {
    !corrected.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::host::{
        ChangeEntry, CommentThread, Iteration, PullRequestInfo, Repository, ThreadComment,
    };
    use crate::llm::Message;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn sample_pr() -> PullRequestInfo {
        PullRequestInfo {
            id: 1,
            title: "Add widget".to_string(),
            is_draft: false,
            source_ref_name: "refs/heads/feature/widget".to_string(),
            target_ref_name: "refs/heads/main".to_string(),
            url: "https://dev.azure.com/acme/Widgets/_git/widgets/pullrequest/1".to_string(),
        }
    }

    fn sample_request() -> ReviewRequest {
        ReviewRequest {
            organization: "acme".to_string(),
            project: "Widgets".to_string(),
            repo_name: "widgets".to_string(),
            pull_request_id: 1,
        }
    }

    #[derive(Default)]
    struct MockState {
        pr: Option<PullRequestInfo>,
        threads: Vec<CommentThread>,
        fail_thread_listing: bool,
        changes: Vec<ChangeEntry>,
        // (path, branch) -> content
        files: HashMap<(String, String), String>,
        posted: Vec<NewCommentThread>,
        pushes: Vec<BranchPush>,
        created_prs: Vec<NewPullRequest>,
        calls: Vec<&'static str>,
    }

    struct MockHost {
        state: Mutex<MockState>,
    }

    impl MockHost {
        fn new(state: MockState) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(state),
            })
        }

        fn with_pr(pr: PullRequestInfo) -> Arc<Self> {
            Self::new(MockState {
                pr: Some(pr),
                ..MockState::default()
            })
        }

        fn posted(&self) -> Vec<NewCommentThread> {
            self.state.lock().unwrap().posted.clone()
        }

        fn calls(&self) -> Vec<&'static str> {
            self.state.lock().unwrap().calls.clone()
        }
    }

    #[async_trait]
    impl RepoHost for MockHost {
        async fn list_repositories(&self, _project: &str) -> Result<Vec<Repository>, HostError> {
            self.state.lock().unwrap().calls.push("list_repositories");
            Ok(vec![Repository {
                id: "repo-1".to_string(),
                name: "widgets".to_string(),
            }])
        }

        async fn get_pull_request(
            &self,
            _repo_id: &str,
            _pr_id: u64,
            _project: &str,
        ) -> Result<PullRequestInfo, HostError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push("get_pull_request");
            Ok(state.pr.clone().expect("mock PR not configured"))
        }

        async fn list_iterations(
            &self,
            _repo_id: &str,
            _pr_id: u64,
            _project: &str,
        ) -> Result<Vec<Iteration>, HostError> {
            self.state.lock().unwrap().calls.push("list_iterations");
            Ok(vec![Iteration { id: 1 }, Iteration { id: 2 }])
        }

        async fn iteration_changes(
            &self,
            _repo_id: &str,
            _pr_id: u64,
            iteration_id: u64,
            _project: &str,
        ) -> Result<Vec<ChangeEntry>, HostError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push("iteration_changes");
            assert_eq!(iteration_id, 2, "must use the latest iteration");
            Ok(state.changes.clone())
        }

        async fn file_content(
            &self,
            _repo_id: &str,
            path: &str,
            branch: &str,
            _project: &str,
        ) -> Result<String, HostError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push("file_content");
            state
                .files
                .get(&(path.to_string(), branch.to_string()))
                .cloned()
                .ok_or(HostError::Api {
                    status: 404,
                    body: format!("{} not found on {}", path, branch),
                })
        }

        async fn list_comment_threads(
            &self,
            _repo_id: &str,
            _pr_id: u64,
            _project: &str,
        ) -> Result<Vec<CommentThread>, HostError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push("list_comment_threads");
            if state.fail_thread_listing {
                return Err(HostError::Api {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(state.threads.clone())
        }

        async fn create_comment_thread(
            &self,
            _repo_id: &str,
            _pr_id: u64,
            _project: &str,
            thread: NewCommentThread,
        ) -> Result<(), HostError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push("create_comment_thread");
            state.posted.push(thread);
            Ok(())
        }

        async fn branch_tip(
            &self,
            _repo_id: &str,
            _branch: &str,
            _project: &str,
        ) -> Result<String, HostError> {
            self.state.lock().unwrap().calls.push("branch_tip");
            Ok("abc123".to_string())
        }

        async fn push_branch(
            &self,
            _repo_id: &str,
            _project: &str,
            push: BranchPush,
        ) -> Result<(), HostError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push("push_branch");
            state.pushes.push(push);
            Ok(())
        }

        async fn create_pull_request(
            &self,
            _repo_id: &str,
            _project: &str,
            pr: NewPullRequest,
        ) -> Result<CreatedPullRequest, HostError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push("create_pull_request");
            state.created_prs.push(pr);
            Ok(CreatedPullRequest { id: 99 })
        }
    }

    /// Returns a canned response keyed by a marker found in the prompt, and
    /// stalls when the prompt mentions STALL_MARKER.
    struct ScriptedModel {
        responses: Vec<(&'static str, String)>,
    }

    const STALL_MARKER: &str = "NEEDS_VERY_SLOW_MODEL";

    #[async_trait]
    impl ModelClient for ScriptedModel {
        async fn chat(
            &self,
            messages: &[Message],
            _system: Option<&str>,
        ) -> Result<String, LlmError> {
            let prompt = &messages[0].content;
            if prompt.contains(STALL_MARKER) {
                tokio::time::sleep(Duration::from_secs(300)).await;
            }
            for (marker, response) in &self.responses {
                if prompt.contains(marker) {
                    return Ok(response.clone());
                }
            }
            Ok(r#"{"comments":[],"newContent":""}"#.to_string())
        }
    }

    fn reviewer(host: Arc<MockHost>, model: ScriptedModel, create_fix_pr: bool) -> PullRequestReviewer {
        PullRequestReviewer::new(
            host,
            Arc::new(model),
            "1. Prefer const over let".to_string(),
            Duration::from_millis(100),
            create_fix_pr,
        )
    }

    #[test]
    fn test_is_ai_authored_title() {
        assert!(is_ai_authored_title("AI: refactor"));
        assert!(is_ai_authored_title("ai: lowercase too"));
        assert!(is_ai_authored_title("[AI Suggested Fixes] foo"));
        assert!(is_ai_authored_title("Follow-up to [AI Suggested Fixes] bar"));
        assert!(!is_ai_authored_title("Maintain the AI module"));
        assert!(!is_ai_authored_title("Add widget"));
    }

    #[tokio::test]
    async fn test_draft_pr_is_skipped() {
        let mut pr = sample_pr();
        pr.is_draft = true;
        let host = MockHost::with_pr(pr);
        let outcome = reviewer(host.clone(), ScriptedModel { responses: vec![] }, true)
            .run(&sample_request())
            .await
            .unwrap();

        assert_eq!(outcome, PassOutcome::Skipped(SkipReason::DraftPullRequest));
        assert!(host.posted().is_empty());
        assert!(!host.calls().contains(&"list_iterations"));
    }

    #[tokio::test]
    async fn test_ai_titled_pr_short_circuits() {
        for title in ["AI: refactor", "[AI Suggested Fixes] foo"] {
            let mut pr = sample_pr();
            pr.title = title.to_string();
            let host = MockHost::with_pr(pr);
            let outcome = reviewer(host.clone(), ScriptedModel { responses: vec![] }, true)
                .run(&sample_request())
                .await
                .unwrap();

            assert_eq!(outcome, PassOutcome::Skipped(SkipReason::AiAuthoredTitle));
            // nothing fetched beyond the PR itself
            assert_eq!(
                host.calls(),
                vec!["list_repositories", "get_pull_request"]
            );
        }
    }

    #[tokio::test]
    async fn test_existing_ai_comment_skips_pass() {
        let host = MockHost::new(MockState {
            pr: Some(sample_pr()),
            threads: vec![CommentThread {
                comments: vec![ThreadComment {
                    content: "[AI Review] [Style 1] - use const".to_string(),
                }],
            }],
            ..MockState::default()
        });
        let outcome = reviewer(host.clone(), ScriptedModel { responses: vec![] }, true)
            .run(&sample_request())
            .await
            .unwrap();

        assert_eq!(outcome, PassOutcome::Skipped(SkipReason::AlreadyReviewed));
        assert!(host.posted().is_empty());
        assert!(!host.calls().contains(&"create_pull_request"));
    }

    #[tokio::test]
    async fn test_thread_listing_failure_passes_open() {
        let host = MockHost::new(MockState {
            pr: Some(sample_pr()),
            fail_thread_listing: true,
            ..MockState::default()
        });
        let outcome = reviewer(host.clone(), ScriptedModel { responses: vec![] }, false)
            .run(&sample_request())
            .await
            .unwrap();

        // the gate passed open and the (empty) pass completed
        assert_eq!(outcome, PassOutcome::Completed(PassSummary::default()));
        assert!(host.calls().contains(&"iteration_changes"));
    }

    fn ten_lines(fifth: &str) -> String {
        format!("l1\nl2\nl3\nl4\n{}\nl6\nl7\nl8\nl9\nl10", fifth)
    }

    #[tokio::test]
    async fn test_changed_line_gets_comment_and_correction_pr() {
        let old = ten_lines("let count = 0;");
        let new = ten_lines("let counter = 0;");
        let corrected = ten_lines("const counter = 0;");

        let mut files = HashMap::new();
        files.insert(("/src/app.ts".to_string(), "main".to_string()), old);
        files.insert(
            ("/src/app.ts".to_string(), "feature/widget".to_string()),
            new,
        );

        let host = MockHost::new(MockState {
            pr: Some(sample_pr()),
            changes: vec![ChangeEntry {
                path: "/src/app.ts".to_string(),
                is_folder: false,
            }],
            files,
            ..MockState::default()
        });

        let response = serde_json::json!({
            "comments": [{"lineNumber": 5, "comment": "[Style 1] - use const"}],
            "newContent": corrected.clone(),
        })
        .to_string();
        let model = ScriptedModel {
            responses: vec![("let counter = 0;", response)],
        };

        let outcome = reviewer(host.clone(), model, true)
            .run(&sample_request())
            .await
            .unwrap();

        let posted = host.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].path, "/src/app.ts");
        assert_eq!(posted[0].line, 5);
        assert_eq!(posted[0].content, "[AI Review] [Style 1] - use const");

        let state = host.state.lock().unwrap();
        assert_eq!(state.pushes.len(), 1);
        let push = &state.pushes[0];
        assert!(push
            .branch_ref
            .starts_with("refs/heads/ai-fix/feature/widget-"));
        assert_eq!(push.from_commit, "abc123");
        assert_eq!(push.edits.len(), 1);
        assert_eq!(push.edits[0].path, "/src/app.ts");
        assert_eq!(push.edits[0].content, corrected);

        assert_eq!(state.created_prs.len(), 1);
        let fix_pr = &state.created_prs[0];
        assert_eq!(fix_pr.title, "[AI Suggested Fixes] Add widget");
        assert!(fix_pr.description.contains(&sample_pr().url));
        assert_eq!(fix_pr.target_ref_name, "refs/heads/main");

        assert_eq!(
            outcome,
            PassOutcome::Completed(PassSummary {
                files_reviewed: 1,
                comments_posted: 1,
                corrections: 1,
                fix_pr_id: Some(99),
            })
        );
    }

    #[tokio::test]
    async fn test_out_of_range_line_is_clamped_and_posted() {
        let old = ten_lines("old line");
        let new = ten_lines("new line");

        let mut files = HashMap::new();
        files.insert(("/src/app.ts".to_string(), "main".to_string()), old);
        files.insert(
            ("/src/app.ts".to_string(), "feature/widget".to_string()),
            new.clone(),
        );

        let host = MockHost::new(MockState {
            pr: Some(sample_pr()),
            changes: vec![ChangeEntry {
                path: "/src/app.ts".to_string(),
                is_folder: false,
            }],
            files,
            ..MockState::default()
        });

        let response = serde_json::json!({
            "comments": [{"lineNumber": 999, "comment": "[G2] - trailing line"}],
            "newContent": new,
        })
        .to_string();
        let model = ScriptedModel {
            responses: vec![("new line", response)],
        };

        reviewer(host.clone(), model, false)
            .run(&sample_request())
            .await
            .unwrap();

        let posted = host.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].line, 10);
    }

    #[tokio::test]
    async fn test_one_file_timing_out_does_not_block_the_other() {
        let mut files = HashMap::new();
        files.insert(
            ("/src/good.ts".to_string(), "main".to_string()),
            "good old".to_string(),
        );
        files.insert(
            ("/src/good.ts".to_string(), "feature/widget".to_string()),
            "good new".to_string(),
        );
        files.insert(
            ("/src/slow.ts".to_string(), "main".to_string()),
            "slow old".to_string(),
        );
        files.insert(
            ("/src/slow.ts".to_string(), "feature/widget".to_string()),
            format!("slow new {}", STALL_MARKER),
        );

        let host = MockHost::new(MockState {
            pr: Some(sample_pr()),
            changes: vec![
                ChangeEntry {
                    path: "/src/good.ts".to_string(),
                    is_folder: false,
                },
                ChangeEntry {
                    path: "/src/slow.ts".to_string(),
                    is_folder: false,
                },
            ],
            files,
            ..MockState::default()
        });

        let response = serde_json::json!({
            "comments": [{"lineNumber": 1, "comment": "[G1] - ok"}],
            "newContent": "good fixed",
        })
        .to_string();
        let model = ScriptedModel {
            responses: vec![("good new", response)],
        };

        let outcome = reviewer(host.clone(), model, true)
            .run(&sample_request())
            .await
            .unwrap();

        let posted = host.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].path, "/src/good.ts");

        match outcome {
            PassOutcome::Completed(summary) => {
                assert_eq!(summary.files_reviewed, 2);
                assert_eq!(summary.comments_posted, 1);
                assert_eq!(summary.corrections, 1);
            }
            other => panic!("expected completion, got {:?}", other),
        }

        // the timed-out file contributed no correction
        let state = host.state.lock().unwrap();
        assert_eq!(state.pushes[0].edits.len(), 1);
        assert_eq!(state.pushes[0].edits[0].path, "/src/good.ts");
    }

    #[tokio::test]
    async fn test_folder_entries_are_not_fetched() {
        let host = MockHost::new(MockState {
            pr: Some(sample_pr()),
            changes: vec![ChangeEntry {
                path: "/src".to_string(),
                is_folder: true,
            }],
            ..MockState::default()
        });

        let outcome = reviewer(host.clone(), ScriptedModel { responses: vec![] }, false)
            .run(&sample_request())
            .await
            .unwrap();

        assert_eq!(outcome, PassOutcome::Completed(PassSummary::default()));
        assert!(!host.calls().contains(&"file_content"));
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_single_file() {
        // only the good file's contents are known to the mock host
        let mut files = HashMap::new();
        files.insert(
            ("/src/good.ts".to_string(), "main".to_string()),
            "same".to_string(),
        );
        files.insert(
            ("/src/good.ts".to_string(), "feature/widget".to_string()),
            "same".to_string(),
        );

        let host = MockHost::new(MockState {
            pr: Some(sample_pr()),
            changes: vec![
                ChangeEntry {
                    path: "/src/good.ts".to_string(),
                    is_folder: false,
                },
                ChangeEntry {
                    path: "/src/missing.ts".to_string(),
                    is_folder: false,
                },
            ],
            files,
            ..MockState::default()
        });

        let outcome = reviewer(host.clone(), ScriptedModel { responses: vec![] }, false)
            .run(&sample_request())
            .await
            .unwrap();

        match outcome {
            PassOutcome::Completed(summary) => {
                assert_eq!(summary.files_reviewed, 2);
                assert_eq!(summary.comments_posted, 0);
                assert_eq!(summary.corrections, 0);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_corrections_without_flag_do_not_open_pr() {
        let mut files = HashMap::new();
        files.insert(
            ("/src/app.ts".to_string(), "main".to_string()),
            "old".to_string(),
        );
        files.insert(
            ("/src/app.ts".to_string(), "feature/widget".to_string()),
            "new".to_string(),
        );

        let host = MockHost::new(MockState {
            pr: Some(sample_pr()),
            changes: vec![ChangeEntry {
                path: "/src/app.ts".to_string(),
                is_folder: false,
            }],
            files,
            ..MockState::default()
        });

        let response = serde_json::json!({
            "comments": [],
            "newContent": "corrected",
        })
        .to_string();
        let model = ScriptedModel {
            responses: vec![("new", response)],
        };

        let outcome = reviewer(host.clone(), model, false)
            .run(&sample_request())
            .await
            .unwrap();

        match outcome {
            PassOutcome::Completed(summary) => {
                assert_eq!(summary.corrections, 1);
                assert_eq!(summary.fix_pr_id, None);
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert!(!host.calls().contains(&"push_branch"));
    }

    #[test]
    fn test_is_valid_correction_rejects_blank_output() {
        assert!(!is_valid_correction(""));
        assert!(!is_valid_correction("  \n\t\n"));
        assert!(is_valid_correction("fn main() {}\n"));
    }

    #[test]
    fn test_branch_name_strips_ref_prefix() {
        assert_eq!(branch_name("refs/heads/main"), "main");
        assert_eq!(branch_name("main"), "main");
    }
}
