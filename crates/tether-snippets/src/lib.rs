//! Inspection snippets evaluated inside the editor page.
//!
//! Each snippet is a single arrow function taking one JSON parameter object.
//! Selectors and limits are passed in from Rust so the matching policy stays
//! on this side of the wire.

use serde_json::Value;

pub const FOCUS_JS: &str = include_str!("focus.js");
pub const CHAT_CANDIDATES_JS: &str = include_str!("chat_candidates.js");
pub const PANEL_TEXT_JS: &str = include_str!("panel_text.js");
pub const WORKSPACE_PROBE_JS: &str = include_str!("workspace_probe.js");

/// Build an expression that calls `snippet` with `params`.
pub fn invocation(snippet: &str, params: &Value) -> String {
    format!("({})({})", snippet.trim(), params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippets_are_embedded() {
        for snippet in [FOCUS_JS, CHAT_CANDIDATES_JS, PANEL_TEXT_JS, WORKSPACE_PROBE_JS] {
            assert!(snippet.contains("(params) =>"));
        }
    }

    #[test]
    fn test_invocation_wraps_params_as_json() {
        let expr = invocation("(params) => params.x", &serde_json::json!({"x": "a\"b"}));
        assert_eq!(expr, r#"((params) => params.x)({"x":"a\"b"})"#);
    }
}
