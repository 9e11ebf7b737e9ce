use std::time::Duration;

use serde::{Deserialize, Serialize};
use tether_common::protocol::ScreenshotOptions;
use tether_common::selection::TargetPolicy;

use crate::selectors::Selectors;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TetherConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub screenshot: ScreenshotOptions,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub selectors: Selectors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_discovery_timeout_ms")]
    pub discovery_timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            discovery_timeout_ms: default_discovery_timeout_ms(),
        }
    }
}

impl EndpointConfig {
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9222
}

fn default_discovery_timeout_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Pause between bulk text insertion and the Enter key.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl SessionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn default_request_timeout_ms() -> u64 {
    tether_cdp::DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

fn default_settle_delay_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetsConfig {
    #[serde(default = "default_product_name")]
    pub product_name: String,
    #[serde(default = "default_secondary_markers")]
    pub secondary_markers: Vec<String>,
    #[serde(default = "default_inspector_markers")]
    pub inspector_markers: Vec<String>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            secondary_markers: default_secondary_markers(),
            inspector_markers: default_inspector_markers(),
        }
    }
}

impl TargetsConfig {
    pub fn policy(&self) -> TargetPolicy {
        TargetPolicy {
            product_name: self.product_name.clone(),
            secondary_markers: self.secondary_markers.clone(),
            inspector_markers: self.inspector_markers.clone(),
        }
    }
}

fn default_product_name() -> String {
    "Antigravity".to_string()
}

fn default_secondary_markers() -> Vec<String> {
    vec!["Launchpad".to_string()]
}

fn default_inspector_markers() -> Vec<String> {
    vec!["DevTools".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    #[serde(default = "default_max_record_chars")]
    pub max_record_chars: usize,
    #[serde(default = "default_panel_max_chars")]
    pub panel_max_chars: usize,
    #[serde(default = "default_conversation_max_chars")]
    pub conversation_max_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            max_record_chars: default_max_record_chars(),
            panel_max_chars: default_panel_max_chars(),
            conversation_max_chars: default_conversation_max_chars(),
        }
    }
}

fn default_max_records() -> usize {
    20
}

fn default_max_record_chars() -> usize {
    1500
}

fn default_panel_max_chars() -> usize {
    8000
}

fn default_conversation_max_chars() -> usize {
    5000
}
