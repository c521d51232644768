//! Turns free text into candidate contact records via the LLM, and parses
//! whatever comes back defensively: model output is hostile input.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::ai::{self, AiConfig};
use crate::error::CrmError;
use crate::prompts;
use crate::store::ContactRecord;

/// Raw model output that wasn't valid JSON (or wasn't an object/array).
/// Carried whole so the failure stays visible to the operator.
#[derive(Debug, thiserror::Error)]
#[error("unparseable extractor output")]
pub struct ParseError {
    pub raw: String,
}

fn fence_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^```(?:json)?").unwrap())
}

fn fence_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```$").unwrap())
}

/// Strip enclosing markdown code fences, if any.
pub fn strip_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let opened = fence_open_re().replace_all(trimmed, "");
    let closed = fence_close_re().replace(opened.trim(), "");
    closed.trim().to_string()
}

/// Parse model output into records. A bare object becomes a one-element
/// list; anything that isn't an object or an array of objects is a
/// [`ParseError`].
pub fn parse_records(raw: &str) -> Result<Vec<ContactRecord>, ParseError> {
    let cleaned = strip_fences(raw);
    let value: serde_json::Value = serde_json::from_str(&cleaned).map_err(|_| ParseError {
        raw: raw.to_string(),
    })?;

    let parsed = if value.is_object() {
        serde_json::from_value::<ContactRecord>(value).map(|r| vec![r])
    } else if value.is_array() {
        serde_json::from_value::<Vec<ContactRecord>>(value)
    } else {
        return Err(ParseError {
            raw: raw.to_string(),
        });
    };

    parsed.map_err(|_| ParseError {
        raw: raw.to_string(),
    })
}

/// Like [`parse_records`], but degrades a parse failure into a one-element
/// list holding an all-null record with the raw output in Notes. Extraction
/// never returns an empty signal for a failure — the operator sees it.
pub fn records_or_fallback(raw: &str) -> Vec<ContactRecord> {
    match parse_records(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(raw = %e.raw, "extractor output unparseable, falling back to notes record");
            vec![ContactRecord::fallback(&e.raw)]
        }
    }
}

/// Run the extraction call for a piece of free text. Always a list.
pub async fn extract(cfg: &AiConfig, text: &str) -> Result<Vec<ContactRecord>, CrmError> {
    let prompt = prompts::extraction_prompt(text);
    let raw = ai::llm_chat(cfg, prompts::EXTRACT_SYSTEM_PROMPT, &prompt).await?;
    Ok(records_or_fallback(&raw))
}
