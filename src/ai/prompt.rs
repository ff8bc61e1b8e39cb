use crate::llm::{Message, PromptStyle};

/// A model-ready review request. `system` is only populated for the chat
/// shape; the templated shape carries everything in its single message.
pub struct ReviewPrompt {
    pub system: Option<String>,
    pub messages: Vec<Message>,
}

const RESPONSE_FORMAT: &str = r#"RESPONSE FORMAT (JSON):
{
    "comments": [{
        "lineNumber": <ACTUAL_NEW_LINE_NUMBER>,
        "comment": "[Guideline] - <TEXT>"
    }],
    "newContent": "<FULL_CORRECTED_CODE_WITHOUT_LINE_NUMBERS>"
}

EXAMPLE:
{
    "comments": [{
        "lineNumber": 42,
        "comment": "[Security 3.1] - Fix SQL injection risk"
    }],
    "newContent": "function safe() {\n  // fixed code\n}"
}"#;

/// Build the review prompt in the shape the active model family expects.
/// Both shapes encode the same contract: comment only on changed lines,
/// exact 1-based line numbers from the NEW version, bracketed guideline
/// references, full corrected file, JSON-only response.
pub fn build(
    style: PromptStyle,
    guidelines: &str,
    numbered_old: &str,
    numbered_new: &str,
) -> ReviewPrompt {
    match style {
        PromptStyle::Chat => chat_prompt(guidelines, numbered_old, numbered_new),
        PromptStyle::Templated => templated_prompt(guidelines, numbered_old, numbered_new),
    }
}

fn chat_prompt(guidelines: &str, numbered_old: &str, numbered_new: &str) -> ReviewPrompt {
    let system = format!(
        "You are a senior code reviewer. Follow these guidelines:\n{}\n\n\
         IMPORTANT: Do not include any thinking process or analysis in your response. \
         Only provide the JSON response as specified.",
        guidelines
    );

    let user = format!(
        "ANALYZE THESE CHANGES:\n\
         - OLD VERSION (numbered):\n{}\n\n\
         - NEW VERSION (numbered):\n{}\n\n\
         INSTRUCTIONS:\n\
         1. Only comment on changed lines\n\
         2. Use EXACT line numbers from NEW VERSION\n\
         3. Reference guidelines like: [Guideline X]\n\
         4. Generate corrected version of the FULL FILE\n\
         5. Maintain original code structure where possible\n\
         6. If no changes are needed, add a comment indicating no changes are required\n\
         7. DO NOT include any thinking process or analysis in your response\n\
         8. ONLY provide the JSON response as specified below\n\n\
         {}",
        numbered_old, numbered_new, RESPONSE_FORMAT
    );

    ReviewPrompt {
        system: Some(system),
        messages: vec![Message::user(user)],
    }
}

fn templated_prompt(guidelines: &str, numbered_old: &str, numbered_new: &str) -> ReviewPrompt {
    let prompt = format!(
        "Follow these code review guidelines:\n{}\n\n\
         ANALYZE THESE CHANGES:\n\
         - OLD VERSION (numbered):\n{}\n\n\
         - NEW VERSION (numbered):\n{}\n\n\
         INSTRUCTIONS:\n\
         1. Only comment on changed lines\n\
         2. Use EXACT line numbers from NEW VERSION\n\
         3. Reference guidelines like: [Guideline X]\n\
         4. Generate corrected version of the FULL FILE\n\
         5. Maintain original code structure where possible\n\
         6. If no changes are needed, add a comment indicating no changes are required\n\
         7. Respond ONLY with valid JSON. Do NOT include any markdown formatting or code blocks\n\n\
         {}",
        guidelines, numbered_old, numbered_new, RESPONSE_FORMAT
    );

    ReviewPrompt {
        system: None,
        messages: vec![Message::user(prompt)],
    }
}
