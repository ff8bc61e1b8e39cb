use actix_web::{web, HttpResponse};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::guidelines;
use crate::host::azure::AzureDevOpsClient;
use crate::llm::create_model_client;
use crate::orchestrator::{is_ai_authored_title, PullRequestReviewer};
use crate::types::{ReviewRequest, WebhookAck, WebhookEvent};

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

/// Service-hook entry point. The synchronous response covers validation and
/// early exits only; the review pass itself is detached and reports through
/// the log.
pub async fn webhook(
    body: web::Json<WebhookEvent>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let event = body.into_inner();

    let event_type = event
        .event_type
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing eventType in payload".to_string()))?;

    if !event_type.starts_with("git.pullrequest.") {
        tracing::info!(%event_type, "ignoring non-PR event");
        return Ok(HttpResponse::Ok().json(WebhookAck {
            status: "ignored",
            message: format!("ignoring non-PR event: {}", event_type),
            pass_id: None,
        }));
    }

    let resource = event
        .resource
        .ok_or_else(|| ApiError::BadRequest("missing PR information in payload".to_string()))?;
    let pull_request_id = resource
        .pull_request_id
        .ok_or_else(|| ApiError::BadRequest("missing PR information in payload".to_string()))?;

    let title = resource.title.unwrap_or_default();
    if is_ai_authored_title(&title) {
        tracing::info!(%title, "skipping AI-generated PR");
        return Ok(HttpResponse::Ok().json(WebhookAck {
            status: "skipped",
            message: "skipped AI-generated PR".to_string(),
            pass_id: None,
        }));
    }

    let repository = resource
        .repository
        .ok_or_else(|| ApiError::BadRequest("missing repository information".to_string()))?;
    let remote_url = repository
        .remote_url
        .ok_or_else(|| ApiError::BadRequest("missing repository remote URL".to_string()))?;
    let organization = organization_from_url(&remote_url).ok_or_else(|| {
        ApiError::BadRequest(format!("cannot determine organization from {}", remote_url))
    })?;
    let project = repository
        .project
        .map(|p| p.name)
        .or_else(|| config.host.default_project.clone())
        .ok_or_else(|| ApiError::BadRequest("missing project name".to_string()))?;
    let repo_name = repository
        .name
        .or_else(|| config.host.default_repo.clone())
        .ok_or_else(|| ApiError::BadRequest("missing repository name".to_string()))?;

    // Fatal-before-work checks: guidelines and model client. Failures here
    // surface synchronously; nothing has been posted yet.
    let guidelines = guidelines::load(&config.review.instruction_source).await?;
    tracing::info!("successfully loaded review guidelines");
    let model = create_model_client(&config.model).map_err(ApiError::Config)?;

    let host = AzureDevOpsClient::new(&organization, config.host.pat.clone());
    let reviewer = PullRequestReviewer::new(
        Arc::new(host),
        Arc::from(model),
        guidelines,
        Duration::from_secs(config.model.timeout_secs),
        config.review.create_fix_pr,
    );
    let request = ReviewRequest {
        organization,
        project,
        repo_name,
        pull_request_id,
    };

    let pass_id = uuid::Uuid::new_v4().to_string();
    let spawned_pass_id = pass_id.clone();
    tokio::spawn(async move {
        match reviewer.run(&request).await {
            Ok(outcome) => {
                tracing::info!(pass_id = %spawned_pass_id, ?outcome, "review pass finished");
            }
            Err(e) => {
                tracing::error!(pass_id = %spawned_pass_id, error = %e, "review pass failed");
            }
        }
    });

    Ok(HttpResponse::Accepted().json(WebhookAck {
        status: "accepted",
        message: format!("review started for PR {}", pull_request_id),
        pass_id: Some(pass_id),
    }))
}

/// First non-empty path segment of the repository remote URL, e.g.
/// `https://dev.azure.com/{organization}/{project}/_git/{repo}`.
fn organization_from_url(remote_url: &str) -> Option<String> {
    let url = reqwest::Url::parse(remote_url).ok()?;
    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health))
            .route("/webhook", web::post().to(webhook)),
    );
}
