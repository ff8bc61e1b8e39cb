pub mod parse;
pub mod prompt;

use crate::lines::number_lines;
use crate::llm::{chat_with_deadline, ModelClient};
use crate::types::ReviewOutcome;
use std::time::Duration;

/// Run the full prompt -> invoke -> sanitize pipeline for one changed file.
///
/// Never fails: a model error or untrusted response degrades to the
/// fallback outcome with a diagnostic attached, so one file's analysis can
/// never take down the pass.
pub async fn analyze_file(
    client: &dyn ModelClient,
    guidelines: &str,
    old_content: &str,
    new_content: &str,
    path: &str,
    deadline: Duration,
) -> ReviewOutcome {
    if old_content == new_content {
        tracing::debug!(path, "contents identical, skipping analysis");
        return ReviewOutcome::unchanged(new_content);
    }

    let numbered_old = number_lines(old_content);
    let numbered_new = number_lines(new_content);
    let review_prompt = prompt::build(
        client.prompt_style(),
        guidelines,
        &numbered_old,
        &numbered_new,
    );

    match chat_with_deadline(
        client,
        &review_prompt.messages,
        review_prompt.system.as_deref(),
        deadline,
    )
    .await
    {
        Ok(raw) => parse::parse_review_response(&raw, new_content),
        Err(e) => {
            tracing::error!(path, error = %e, "model invocation failed");
            ReviewOutcome::fallback(new_content, e.category())
        }
    }
}
