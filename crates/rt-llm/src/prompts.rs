//! Prompt builders.
//!
//! Each builder returns a [`ChatRequest`] whose user message spells out the
//! exact JSON shape expected back, matching the typed replies in
//! [`crate::reply`].

use crate::ChatRequest;

/// Content past this many characters is cut before prompting.
pub const MAX_CONTENT_CHARS: usize = 12_000;

/// Extra ACH context past this many characters is cut.
pub const MAX_ACH_CONTEXT_CHARS: usize = 1_000;

const ANALYST_SYSTEM_PROMPT: &str = "You are an expert intelligence analyst assistant. \
You provide objective, evidence-based analysis for professional analysts and researchers. \
Be explicit about certainty and assumptions, and stay aware of bias and alternative explanations. \
Always answer with a single JSON object.";

/// Cut `text` to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    text.char_indices().nth(max).map_or(text, |(idx, _)| &text[..idx])
}

/// Summary, entity extraction, and per-claim deception scoring for one
/// article or document.
#[must_use]
pub fn content_intelligence_prompt(content: &str, url: Option<&str>) -> ChatRequest {
    let source_line = url.map_or_else(String::new, |u| format!("Source URL: {u}\n"));
    let user = format!(
        "Analyze the following content for an intelligence analyst.\n\
         {source_line}\n\
         Content:\n{content}\n\n\
         Return a JSON object with exactly these fields:\n\
         - \"summary\": a neutral summary of at most 200 words\n\
         - \"entities\": {{\"people\": [..], \"organizations\": [..], \"locations\": [..]}}\n\
         - \"claims\": a list of the key factual claims, each \
         {{\"claim\": text, \"risk_score\": 0-100 likelihood that the claim is deceptive or misleading, \
         \"red_flags\": [short reasons]}}\n",
        content = truncate_chars(content, MAX_CONTENT_CHARS),
    );
    ChatRequest {
        system: ANALYST_SYSTEM_PROMPT.to_string(),
        user,
        temperature: None,
        max_tokens: Some(2_000),
    }
}

/// Competing hypotheses and candidate evidence for a key question.
#[must_use]
pub fn ach_suggestion_prompt(key_question: &str, context: Option<&str>) -> ChatRequest {
    let context_block = context
        .filter(|c| !c.trim().is_empty())
        .map_or_else(String::new, |c| {
            format!("Additional context: {}\n", truncate_chars(c, MAX_ACH_CONTEXT_CHARS))
        });
    let user = format!(
        "Generate 4-6 competing hypotheses for an Analysis of Competing Hypotheses.\n\n\
         Key question: {key_question}\n\
         {context_block}\n\
         The hypotheses must be mutually exclusive, cover different actors or motivations, \
         include at least one deception or misdirection hypothesis, and include a null or \
         minimal-activity hypothesis. Then list 3-5 pieces of evidence or arguments that would \
         help discriminate between them.\n\n\
         Return a JSON object: {{\"hypotheses\": [strings], \"evidence\": [strings]}}"
    );
    ChatRequest {
        system: "You are an expert intelligence analyst specializing in hypothesis generation. \
                 Always answer with a single JSON object."
            .to_string(),
        user,
        temperature: Some(0.8),
        max_tokens: Some(800),
    }
}
