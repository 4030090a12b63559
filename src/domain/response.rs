//! Generator reply parsing.
//!
//! The generator is asked for a JSON object but frequently wraps it in a
//! Markdown code fence or returns prose. Parsing never fails outward: any
//! reply that does not yield a JSON object is replaced by the deterministic
//! fallback document.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::domain::campaign::CampaignInput;
use crate::domain::fallback;
use crate::domain::strategy::StrategyDocument;

/// Why a reply could not be turned into a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("reply is empty")]
    Empty,

    #[error("reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("reply is JSON but not an object (got {0})")]
    NotAnObject(&'static str),
}

/// Where a parsed document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed,
    Synthesized,
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("fence pattern is valid"))
}

/// Body of the first fenced code block, or the whole text when there is none.
pub fn extract_candidate(raw: &str) -> &str {
    fence_regex()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
        .trim()
}

/// Parse a reply into a document without falling back.
pub fn try_parse(raw: &str) -> Result<StrategyDocument, ParseError> {
    let candidate = extract_candidate(raw);
    if candidate.is_empty() {
        return Err(ParseError::Empty);
    }
    let value: Value =
        serde_json::from_str(candidate).map_err(|err| ParseError::InvalidJson(err.to_string()))?;
    match value {
        Value::Object(map) => Ok(StrategyDocument::from_map(map)),
        other => Err(ParseError::NotAnObject(json_kind(&other))),
    }
}

/// Parse a reply, synthesizing a document from the brief when it is unusable.
pub fn parse(raw: &str, input: &CampaignInput) -> StrategyDocument {
    parse_with_outcome(raw, input).0
}

/// Like [`parse`], also reporting whether the fallback was used.
pub fn parse_with_outcome(raw: &str, input: &CampaignInput) -> (StrategyDocument, ParseOutcome) {
    match try_parse(raw) {
        Ok(document) => (document, ParseOutcome::Parsed),
        Err(err) => {
            tracing::warn!(error = %err, "generator reply unusable; synthesizing fallback strategy");
            (fallback::synthesize(input), ParseOutcome::Synthesized)
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
