//! Markup hooks the inspection snippets look for.
//!
//! The editor's DOM is not a stable interface. Every list is ordered by
//! preference and the snippets stop at the first selector that produces
//! something, so adding a newer selector at the front is the usual fix after
//! an editor update.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyShortcut {
    pub key: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selectors {
    #[serde(default = "default_chat_containers")]
    pub chat_containers: Vec<String>,
    #[serde(default = "default_panels")]
    pub panels: Vec<String>,
    #[serde(default = "default_markdown")]
    pub markdown: Vec<String>,
    #[serde(default = "default_text_inputs")]
    pub text_inputs: Vec<String>,
    #[serde(default = "default_editables")]
    pub editables: Vec<String>,
    #[serde(default = "default_click_targets")]
    pub click_targets: Vec<String>,
    #[serde(default = "default_tabs")]
    pub tabs: Vec<String>,
    #[serde(default = "default_uri_attributes")]
    pub uri_attributes: Vec<String>,
    /// Dispatched at the document root when no input can be focused directly.
    #[serde(default = "default_focus_shortcut")]
    pub focus_shortcut: KeyShortcut,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            chat_containers: default_chat_containers(),
            panels: default_panels(),
            markdown: default_markdown(),
            text_inputs: default_text_inputs(),
            editables: default_editables(),
            click_targets: default_click_targets(),
            tabs: default_tabs(),
            uri_attributes: default_uri_attributes(),
            focus_shortcut: default_focus_shortcut(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_chat_containers() -> Vec<String> {
    strings(&[
        "#antigravity\\.agentPanel [data-message-author-role]",
        "#antigravity\\.agentPanel .chat-message",
        "[class*=\"conversation\"] [class*=\"message\"]",
        ".interactive-item-container",
        "[role=\"article\"]",
        ".prose",
    ])
}

fn default_panels() -> Vec<String> {
    strings(&[
        "#antigravity\\.agentPanel",
        "[aria-label*=\"Agent\"]",
        ".interactive-session",
        ".chat-widget",
    ])
}

fn default_markdown() -> Vec<String> {
    strings(&[".rendered-markdown", ".markdown-body", ".prose"])
}

fn default_text_inputs() -> Vec<String> {
    strings(&[
        "#antigravity\\.agentPanel textarea",
        "textarea[placeholder*=\"Ask\"]",
        ".chat-input textarea",
        ".interactive-input-part textarea",
    ])
}

fn default_editables() -> Vec<String> {
    strings(&[
        "#antigravity\\.agentPanel [contenteditable=\"true\"]",
        "[contenteditable=\"true\"][role=\"textbox\"]",
        ".chat-input [contenteditable=\"true\"]",
        "[contenteditable=\"true\"]",
    ])
}

fn default_click_targets() -> Vec<String> {
    strings(&[
        "#antigravity\\.agentPanel .input-container",
        ".chat-input",
        ".interactive-input-part",
    ])
}

fn default_tabs() -> Vec<String> {
    strings(&[".tab.active", "[role=\"tab\"]"])
}

fn default_uri_attributes() -> Vec<String> {
    strings(&["data-resource-uri", "data-uri", "href"])
}

fn default_focus_shortcut() -> KeyShortcut {
    KeyShortcut {
        key: "l".to_string(),
        code: "KeyL".to_string(),
    }
}
