use crate::error::HostError;
use crate::host::{
    BranchPush, ChangeEntry, CommentThread, CreatedPullRequest, Iteration, NewCommentThread,
    NewPullRequest, PullRequestInfo, RepoHost, Repository, ThreadComment,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

const API_VERSION: &str = "7.1";

/// Thin Azure DevOps Git REST client. Every method is one API call; no
/// retries, no caching — a failed call surfaces as a `HostError` and the
/// orchestrator decides the blast radius.
pub struct AzureDevOpsClient {
    client: Client,
    base_url: String,
    pat: SecretString,
}

impl AzureDevOpsClient {
    pub fn new(organization: &str, pat: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("https://dev.azure.com/{}", organization),
            pat,
        }
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .basic_auth("", Some(self.pat.expose_secret()))
    }

    fn post(&self, url: String) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .basic_auth("", Some(self.pat.expose_secret()))
    }

    async fn check(response: Response) -> Result<Response, HostError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(HostError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[derive(Deserialize)]
struct ListEnvelope<T> {
    value: Vec<T>,
}

#[derive(Deserialize)]
struct RepositoryDto {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestDto {
    pull_request_id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    is_draft: bool,
    source_ref_name: String,
    target_ref_name: String,
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct IterationDto {
    id: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IterationChangesDto {
    #[serde(default)]
    change_entries: Vec<ChangeEntryDto>,
}

#[derive(Deserialize)]
struct ChangeEntryDto {
    #[serde(default)]
    item: Option<ChangeItemDto>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeItemDto {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    is_folder: bool,
}

#[derive(Deserialize)]
struct ThreadDto {
    #[serde(default)]
    comments: Vec<ThreadCommentDto>,
}

#[derive(Deserialize)]
struct ThreadCommentDto {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct BranchStatsDto {
    commit: CommitDto,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitDto {
    commit_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPullRequestDto {
    pull_request_id: u64,
}

#[async_trait]
impl RepoHost for AzureDevOpsClient {
    async fn list_repositories(&self, project: &str) -> Result<Vec<Repository>, HostError> {
        let url = format!(
            "{}/{}/_apis/git/repositories?api-version={}",
            self.base_url, project, API_VERSION
        );
        let response = Self::check(self.get(url).send().await?).await?;
        let envelope: ListEnvelope<RepositoryDto> = response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))?;
        Ok(envelope
            .value
            .into_iter()
            .map(|r| Repository {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn get_pull_request(
        &self,
        repo_id: &str,
        pr_id: u64,
        project: &str,
    ) -> Result<PullRequestInfo, HostError> {
        let url = format!(
            "{}/{}/_apis/git/repositories/{}/pullrequests/{}?api-version={}",
            self.base_url, project, repo_id, pr_id, API_VERSION
        );
        let response = Self::check(self.get(url).send().await?).await?;
        let dto: PullRequestDto = response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))?;
        Ok(PullRequestInfo {
            id: dto.pull_request_id,
            title: dto.title,
            is_draft: dto.is_draft,
            source_ref_name: dto.source_ref_name,
            target_ref_name: dto.target_ref_name,
            url: dto.url,
        })
    }

    async fn list_iterations(
        &self,
        repo_id: &str,
        pr_id: u64,
        project: &str,
    ) -> Result<Vec<Iteration>, HostError> {
        let url = format!(
            "{}/{}/_apis/git/repositories/{}/pullRequests/{}/iterations?api-version={}",
            self.base_url, project, repo_id, pr_id, API_VERSION
        );
        let response = Self::check(self.get(url).send().await?).await?;
        let envelope: ListEnvelope<IterationDto> = response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))?;
        Ok(envelope
            .value
            .into_iter()
            .map(|i| Iteration { id: i.id })
            .collect())
    }

    async fn iteration_changes(
        &self,
        repo_id: &str,
        pr_id: u64,
        iteration_id: u64,
        project: &str,
    ) -> Result<Vec<ChangeEntry>, HostError> {
        let url = format!(
            "{}/{}/_apis/git/repositories/{}/pullRequests/{}/iterations/{}/changes?api-version={}",
            self.base_url, project, repo_id, pr_id, iteration_id, API_VERSION
        );
        let response = Self::check(self.get(url).send().await?).await?;
        let dto: IterationChangesDto = response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))?;
        Ok(dto
            .change_entries
            .into_iter()
            .filter_map(|entry| {
                let item = entry.item?;
                Some(ChangeEntry {
                    path: item.path?,
                    is_folder: item.is_folder,
                })
            })
            .collect())
    }

    async fn file_content(
        &self,
        repo_id: &str,
        path: &str,
        branch: &str,
        project: &str,
    ) -> Result<String, HostError> {
        let url = format!(
            "{}/{}/_apis/git/repositories/{}/items?api-version={}",
            self.base_url, project, repo_id, API_VERSION
        );
        let response = Self::check(
            self.get(url)
                .query(&[
                    ("path", path),
                    ("versionDescriptor.versionType", "branch"),
                    ("versionDescriptor.version", branch),
                    ("includeContent", "true"),
                ])
                .header("Accept", "text/plain")
                .send()
                .await?,
        )
        .await?;
        Ok(response.text().await?)
    }

    async fn list_comment_threads(
        &self,
        repo_id: &str,
        pr_id: u64,
        project: &str,
    ) -> Result<Vec<CommentThread>, HostError> {
        let url = format!(
            "{}/{}/_apis/git/repositories/{}/pullRequests/{}/threads?api-version={}",
            self.base_url, project, repo_id, pr_id, API_VERSION
        );
        let response = Self::check(self.get(url).send().await?).await?;
        let envelope: ListEnvelope<ThreadDto> = response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))?;
        Ok(envelope
            .value
            .into_iter()
            .map(|t| CommentThread {
                comments: t
                    .comments
                    .into_iter()
                    .filter_map(|c| c.content)
                    .map(|content| ThreadComment { content })
                    .collect(),
            })
            .collect())
    }

    async fn create_comment_thread(
        &self,
        repo_id: &str,
        pr_id: u64,
        project: &str,
        thread: NewCommentThread,
    ) -> Result<(), HostError> {
        let url = format!(
            "{}/{}/_apis/git/repositories/{}/pullRequests/{}/threads?api-version={}",
            self.base_url, project, repo_id, pr_id, API_VERSION
        );
        let body = json!({
            "comments": [{
                "content": thread.content,
                "parentCommentId": 0,
                "commentType": "text",
            }],
            "status": "active",
            "threadContext": {
                "filePath": thread.path,
                "rightFileStart": {"line": thread.line, "offset": 1},
                "rightFileEnd": {"line": thread.line, "offset": 1},
            },
        });
        Self::check(self.post(url).json(&body).send().await?).await?;
        Ok(())
    }

    async fn branch_tip(
        &self,
        repo_id: &str,
        branch: &str,
        project: &str,
    ) -> Result<String, HostError> {
        let url = format!(
            "{}/{}/_apis/git/repositories/{}/stats/branches?api-version={}",
            self.base_url, project, repo_id, API_VERSION
        );
        let response =
            Self::check(self.get(url).query(&[("name", branch)]).send().await?).await?;
        let dto: BranchStatsDto = response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))?;
        Ok(dto.commit.commit_id)
    }

    async fn push_branch(
        &self,
        repo_id: &str,
        project: &str,
        push: BranchPush,
    ) -> Result<(), HostError> {
        let url = format!(
            "{}/{}/_apis/git/repositories/{}/pushes?api-version={}",
            self.base_url, project, repo_id, API_VERSION
        );
        let changes: Vec<serde_json::Value> = push
            .edits
            .iter()
            .map(|edit| {
                json!({
                    "changeType": "edit",
                    "item": {"path": edit.path},
                    "newContent": {
                        "content": edit.content,
                        "contentType": "rawtext",
                    },
                })
            })
            .collect();
        let body = json!({
            "refUpdates": [{
                "name": push.branch_ref,
                "oldObjectId": push.from_commit,
            }],
            "commits": [{
                "comment": push.commit_message,
                "changes": changes,
            }],
        });
        Self::check(self.post(url).json(&body).send().await?).await?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        repo_id: &str,
        project: &str,
        pr: NewPullRequest,
    ) -> Result<CreatedPullRequest, HostError> {
        let url = format!(
            "{}/{}/_apis/git/repositories/{}/pullrequests?api-version={}",
            self.base_url, project, repo_id, API_VERSION
        );
        let body = json!({
            "title": pr.title,
            "description": pr.description,
            "sourceRefName": pr.source_ref_name,
            "targetRefName": pr.target_ref_name,
        });
        let response = Self::check(self.post(url).json(&body).send().await?).await?;
        let dto: CreatedPullRequestDto = response
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))?;
        Ok(CreatedPullRequest {
            id: dto.pull_request_id,
        })
    }
}
