//! Chat, panel and conversation scraping.
//!
//! Snippets only collect raw text; filtering and role assignment happen
//! here so they can be tested without a live editor.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tether_cdp::Session;
use tether_common::TetherError;
use tether_common::classifier::{TextClassifier, Verdict, role_from_class_meta, truncate_chars};
use tether_common::protocol::{ChatExtraction, ConversationRecord, PanelContent};
use tether_snippets::{CHAT_CANDIDATES_JS, PANEL_TEXT_JS, invocation};
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::selectors::Selectors;

/// Decode a snippet result. `null` (a snippet that returned nothing) is `T::default()`.
pub fn decode_or_default<T>(value: Value) -> Result<T, TetherError>
where
    T: DeserializeOwned + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value)
        .map_err(|e| TetherError::protocol(format!("unexpected snippet result: {}", e)))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub meta: String,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateScan {
    #[serde(default)]
    selector: Option<String>,
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct PanelScan {
    #[serde(default)]
    selector: Option<String>,
    #[serde(default)]
    text: String,
}

/// Filter raw candidates into conversation records.
///
/// Keeps the last `max_records` accepted records; `total` counts all of them.
pub fn classify_candidates(
    candidates: &[Candidate],
    classifier: &TextClassifier,
    limits: &ExtractionConfig,
    now: DateTime<Utc>,
) -> ChatExtraction {
    let mut accepted = Vec::new();
    for candidate in candidates {
        let text = candidate.text.trim();
        match classifier.classify(text) {
            Verdict::Accepted => {
                let (content, _) = truncate_chars(text, limits.max_record_chars);
                accepted.push(ConversationRecord {
                    role: role_from_class_meta(&candidate.meta),
                    content,
                    timestamp: now,
                });
            }
            Verdict::Rejected(reason) => {
                debug!(reason = %reason, chars = text.chars().count(), "candidate rejected");
            }
        }
    }

    let total = accepted.len();
    let skip = total.saturating_sub(limits.max_records);
    ChatExtraction {
        messages: accepted.into_iter().skip(skip).collect(),
        total,
        selector: None,
    }
}

pub async fn chat_messages(
    session: &Session,
    selectors: &Selectors,
    classifier: &TextClassifier,
    limits: &ExtractionConfig,
) -> Result<ChatExtraction, TetherError> {
    let params = json!({ "selectors": selectors.chat_containers });
    let value = session
        .evaluate(&invocation(CHAT_CANDIDATES_JS, &params))
        .await?;
    let scan: CandidateScan = decode_or_default(value)?;
    debug!(selector = ?scan.selector, candidates = scan.candidates.len(), "chat candidates collected");

    let mut extraction = classify_candidates(&scan.candidates, classifier, limits, Utc::now());
    extraction.selector = scan.selector;
    Ok(extraction)
}

async fn panel_scan(
    session: &Session,
    params: Value,
    max_chars: usize,
) -> Result<PanelContent, TetherError> {
    let value = session.evaluate(&invocation(PANEL_TEXT_JS, &params)).await?;
    let scan: PanelScan = decode_or_default(value)?;
    let (text, truncated) = truncate_chars(scan.text.trim(), max_chars);
    Ok(PanelContent {
        selector: scan.selector,
        text,
        truncated,
    })
}

/// Visible text of the first matching agent panel.
pub async fn agent_panel_content(
    session: &Session,
    selectors: &Selectors,
    limits: &ExtractionConfig,
) -> Result<PanelContent, TetherError> {
    let params = json!({
        "selectors": selectors.panels,
        "maxChars": limits.panel_max_chars,
    });
    panel_scan(session, params, limits.panel_max_chars).await
}

/// Rendered markdown blocks of the panel, joined by blank lines.
pub async fn conversation_text(
    session: &Session,
    selectors: &Selectors,
    limits: &ExtractionConfig,
) -> Result<PanelContent, TetherError> {
    let params = json!({
        "selectors": selectors.panels,
        "markdownSelectors": selectors.markdown,
        "maxChars": limits.conversation_max_chars,
    });
    panel_scan(session, params, limits.conversation_max_chars).await
}
