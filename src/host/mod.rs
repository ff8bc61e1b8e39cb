pub mod azure;

use crate::error::HostError;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct Repository {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct PullRequestInfo {
    pub id: u64,
    pub title: String,
    pub is_draft: bool,
    pub source_ref_name: String,
    pub target_ref_name: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Iteration {
    pub id: u64,
}

#[derive(Debug, Clone)]
pub struct ChangeEntry {
    pub path: String,
    pub is_folder: bool,
}

#[derive(Debug, Clone)]
pub struct CommentThread {
    pub comments: Vec<ThreadComment>,
}

#[derive(Debug, Clone)]
pub struct ThreadComment {
    pub content: String,
}

/// A new thread anchored to one line of the new file version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommentThread {
    pub path: String,
    pub line: u32,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct FileEdit {
    pub path: String,
    pub content: String,
}

/// One branch creation plus a single commit carrying all file edits.
#[derive(Debug, Clone)]
pub struct BranchPush {
    pub branch_ref: String,
    pub from_commit: String,
    pub commit_message: String,
    pub edits: Vec<FileEdit>,
}

#[derive(Debug, Clone)]
pub struct NewPullRequest {
    pub title: String,
    pub description: String,
    pub source_ref_name: String,
    pub target_ref_name: String,
}

#[derive(Debug, Clone)]
pub struct CreatedPullRequest {
    pub id: u64,
}

/// The repository host capability the orchestrator consumes. All state of
/// record (branches, pull requests, comment threads) lives behind this
/// seam, which keeps the pipeline testable against in-memory fakes.
#[async_trait]
pub trait RepoHost: Send + Sync {
    async fn list_repositories(&self, project: &str) -> Result<Vec<Repository>, HostError>;

    async fn get_pull_request(
        &self,
        repo_id: &str,
        pr_id: u64,
        project: &str,
    ) -> Result<PullRequestInfo, HostError>;

    async fn list_iterations(
        &self,
        repo_id: &str,
        pr_id: u64,
        project: &str,
    ) -> Result<Vec<Iteration>, HostError>;

    async fn iteration_changes(
        &self,
        repo_id: &str,
        pr_id: u64,
        iteration_id: u64,
        project: &str,
    ) -> Result<Vec<ChangeEntry>, HostError>;

    async fn file_content(
        &self,
        repo_id: &str,
        path: &str,
        branch: &str,
        project: &str,
    ) -> Result<String, HostError>;

    async fn list_comment_threads(
        &self,
        repo_id: &str,
        pr_id: u64,
        project: &str,
    ) -> Result<Vec<CommentThread>, HostError>;

    async fn create_comment_thread(
        &self,
        repo_id: &str,
        pr_id: u64,
        project: &str,
        thread: NewCommentThread,
    ) -> Result<(), HostError>;

    async fn branch_tip(
        &self,
        repo_id: &str,
        branch: &str,
        project: &str,
    ) -> Result<String, HostError>;

    async fn push_branch(
        &self,
        repo_id: &str,
        project: &str,
        push: BranchPush,
    ) -> Result<(), HostError>;

    async fn create_pull_request(
        &self,
        repo_id: &str,
        project: &str,
        pr: NewPullRequest,
    ) -> Result<CreatedPullRequest, HostError>;
}
