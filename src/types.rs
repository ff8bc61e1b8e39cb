use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Webhook payload
// ----------------------------------------------------------------------------

/// Inbound service-hook payload. Only the fields the review pipeline reads
/// are modeled; the rest of the hook body is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub resource: Option<WebhookResource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResource {
    #[serde(default)]
    pub pull_request_id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub repository: Option<WebhookRepository>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRepository {
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub project: Option<WebhookProject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookProject {
    pub name: String,
}

/// Synchronous answer to a webhook delivery. Reflects validation and
/// early-exit outcomes only, never the async pipeline result.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_id: Option<String>,
}

// ----------------------------------------------------------------------------
// Review pass
// ----------------------------------------------------------------------------

/// Identifies one review pass, built from a validated webhook delivery.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub organization: String,
    pub project: String,
    pub repo_name: String,
    pub pull_request_id: u64,
}

/// A line-anchored comment produced by the model, already clamped to the new
/// file's line range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiComment {
    pub line_number: u32,
    pub text: String,
}

/// Result of analyzing one changed file. `analysis_error` is set when the
/// model call or response parsing degraded to the fallback outcome.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub comments: Vec<AiComment>,
    pub new_content: String,
    pub analysis_error: Option<String>,
}

impl ReviewOutcome {
    /// No comments, content unchanged. Used when old and new versions are
    /// identical and the model is never invoked.
    pub fn unchanged(new_content: &str) -> Self {
        Self {
            comments: Vec::new(),
            new_content: new_content.to_string(),
            analysis_error: None,
        }
    }

    /// The safe default when the model's response cannot be trusted: no
    /// comments, content unchanged, diagnostic attached.
    pub fn fallback(new_content: &str, error: impl Into<String>) -> Self {
        Self {
            comments: Vec::new(),
            new_content: new_content.to_string(),
            analysis_error: Some(error.into()),
        }
    }
}

/// A proposed full-file replacement, queued for the follow-up fix PR.
#[derive(Debug, Clone)]
pub struct FileCorrection {
    pub path: String,
    pub original_content: String,
    pub corrected_content: String,
}

/// Per-file task result. The orchestrator folds these after joining all
/// file tasks; no accumulator is shared across tasks.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: String,
    pub comments_posted: usize,
    pub correction: Option<FileCorrection>,
}

impl FileReport {
    pub fn empty(path: &str) -> Self {
        Self {
            path: path.to_string(),
            comments_posted: 0,
            correction: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DraftPullRequest,
    AiAuthoredTitle,
    AlreadyReviewed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub files_reviewed: usize,
    pub comments_posted: usize,
    pub corrections: usize,
    pub fix_pr_id: Option<u64>,
}

/// Terminal state of one review pass, logged at the spawn site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Skipped(SkipReason),
    Completed(PassSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_event_deserializes_camel_case() {
        let json = r#"{
            "eventType": "git.pullrequest.created",
            "resource": {
                "pullRequestId": 42,
                "title": "Add feature",
                "repository": {
                    "remoteUrl": "https://dev.azure.com/acme/Widgets/_git/widgets",
                    "name": "widgets",
                    "project": {"name": "Widgets"}
                }
            }
        }"#;
        let event: WebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type.as_deref(), Some("git.pullrequest.created"));
        let resource = event.resource.unwrap();
        assert_eq!(resource.pull_request_id, Some(42));
        assert_eq!(
            resource.repository.unwrap().project.unwrap().name,
            "Widgets"
        );
    }

    #[test]
    fn test_webhook_event_tolerates_missing_fields() {
        let event: WebhookEvent = serde_json::from_str("{}").unwrap();
        assert!(event.event_type.is_none());
        assert!(event.resource.is_none());
    }

    #[test]
    fn test_webhook_ack_omits_absent_pass_id() {
        let ack = WebhookAck {
            status: "ignored",
            message: "non-PR event".to_string(),
            pass_id: None,
        };
        let json = serde_json::to_string(&ack).unwrap();
        assert!(!json.contains("pass_id"));
    }

    #[test]
    fn test_review_outcome_fallback() {
        let outcome = ReviewOutcome::fallback("line1\nline2", "model returned garbage");
        assert!(outcome.comments.is_empty());
        assert_eq!(outcome.new_content, "line1\nline2");
        assert_eq!(
            outcome.analysis_error.as_deref(),
            Some("model returned garbage")
        );
    }

    #[test]
    fn test_review_outcome_unchanged_has_no_error() {
        let outcome = ReviewOutcome::unchanged("content");
        assert!(outcome.comments.is_empty());
        assert!(outcome.analysis_error.is_none());
    }
}
