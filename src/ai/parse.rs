use crate::lines::split_lines;
use crate::types::{AiComment, ReviewOutcome};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)```").unwrap());

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    comments: Vec<RawComment>,
    new_content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComment {
    line_number: i64,
    comment: String,
}

/// Convert a raw model response into a trusted `ReviewOutcome`.
///
/// This is the only boundary between loosely-structured external text and
/// data posted back to the repository host. It never fails: any parse or
/// shape problem degrades to the fallback outcome (no comments, content
/// unchanged, diagnostic attached).
pub fn parse_review_response(raw: &str, new_content: &str) -> ReviewOutcome {
    let line_count = split_lines(new_content).len();

    let json_span = match extract_json(raw) {
        Some(span) => span,
        None => {
            return ReviewOutcome::fallback(new_content, "no JSON object found in model response")
        }
    };

    // Models that emit visible deliberation wrap it in <think> tags; that
    // is not a parse failure, just noise to remove.
    let cleaned = THINK_BLOCK.replace_all(&json_span, "");

    match serde_json::from_str::<RawResult>(&cleaned) {
        Ok(result) => ReviewOutcome {
            comments: clamp_comments(result.comments, line_count),
            new_content: result.new_content,
            analysis_error: None,
        },
        Err(e) => ReviewOutcome::fallback(
            new_content,
            format!("failed to parse model response: {}", e),
        ),
    }
}

/// Prefer a fenced ```json block; fall back to the outermost `{...}` span.
fn extract_json(raw: &str) -> Option<String> {
    if let Some(captures) = FENCED_JSON.captures(raw) {
        return Some(captures[1].to_string());
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end >= start).then(|| raw[start..=end].to_string())
}

/// Clamp each line number into `[1, line_count]`, then drop anything still
/// out of range. The only way a clamped value escapes the range is a zero
/// line count, which drops every comment.
fn clamp_comments(raw: Vec<RawComment>, line_count: usize) -> Vec<AiComment> {
    let count = line_count as i64;
    raw.into_iter()
        .filter_map(|c| {
            let clamped = c.line_number.max(1).min(count);
            (clamped >= 1 && clamped <= count).then_some(AiComment {
                line_number: clamped as u32,
                text: c.comment,
            })
        })
        .collect()
}
