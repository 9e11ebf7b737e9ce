use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One debuggable surface as reported by `GET /json/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtools_frontend_url: Option<String>,
    /// Control channel address. Absent when another client is already attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_socket_debugger_url: Option<String>,
}

impl Target {
    pub fn is_page(&self) -> bool {
        self.target_type == "page"
    }
}

/// Response of `GET /json/version`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "Browser", default)]
    pub browser: String,
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,
    #[serde(
        rename = "webSocketDebuggerUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub web_socket_debugger_url: Option<String>,
}

/// Outcome of the availability probe. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AvailabilityReport {
    pub fn up(browser: impl Into<String>) -> Self {
        Self {
            available: true,
            browser: Some(browser.into()),
            error: None,
        }
    }

    pub fn down(error: impl Into<String>) -> Self {
        Self {
            available: false,
            browser: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "webp" => Ok(ImageFormat::Webp),
            other => Err(format!("unsupported image format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotOptions {
    #[serde(default)]
    pub format: ImageFormat,
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::default(),
            quality: default_quality(),
        }
    }
}

fn default_quality() -> u8 {
    80
}

/// Encoded image exactly as the protocol returned it (base64).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screenshot {
    pub format: ImageFormat,
    pub data: String,
}

/// Which strategy the focus snippet ended up using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusOutcome {
    TextInput,
    Editable,
    Click,
    Shortcut,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatExtraction {
    pub messages: Vec<ConversationRecord>,
    /// Accepted records before the tail limit was applied.
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    pub text: String,
    pub truncated: bool,
}

impl PanelContent {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_json_list_entry() {
        let json = serde_json::json!({
            "description": "",
            "devtoolsFrontendUrl": "/devtools/inspector.html?ws=127.0.0.1:9222/devtools/page/A1",
            "id": "A1",
            "title": "MyProject - Antigravity",
            "type": "page",
            "url": "vscode-file://vscode-app/workbench.html",
            "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/A1"
        });
        let target: Target = serde_json::from_value(json).unwrap();
        assert!(target.is_page());
        assert_eq!(target.title, "MyProject - Antigravity");
        assert_eq!(
            target.web_socket_debugger_url.as_deref(),
            Some("ws://127.0.0.1:9222/devtools/page/A1")
        );
    }

    #[test]
    fn test_target_without_control_address() {
        let json = serde_json::json!({"id": "W", "type": "worker", "title": "", "url": ""});
        let target: Target = serde_json::from_value(json).unwrap();
        assert!(!target.is_page());
        assert!(target.web_socket_debugger_url.is_none());
    }

    #[test]
    fn test_version_info_header_style_keys() {
        let json = serde_json::json!({
            "Browser": "Chrome/128.0.6613.186",
            "Protocol-Version": "1.3",
            "User-Agent": "Mozilla/5.0"
        });
        let info: VersionInfo = serde_json::from_value(json).unwrap();
        assert_eq!(info.browser, "Chrome/128.0.6613.186");
        assert_eq!(info.protocol_version, "1.3");
    }

    #[test]
    fn test_availability_report_omits_empty_fields() {
        let down = serde_json::to_value(AvailabilityReport::down("connection refused")).unwrap();
        assert_eq!(down["available"], false);
        assert_eq!(down["error"], "connection refused");
        assert!(down.get("browser").is_none());
    }

    #[test]
    fn test_image_format_parsing() {
        assert_eq!("JPG".parse::<ImageFormat>(), Ok(ImageFormat::Jpeg));
        assert_eq!("webp".parse::<ImageFormat>(), Ok(ImageFormat::Webp));
        assert!("gif".parse::<ImageFormat>().is_err());
        assert_eq!(ScreenshotOptions::default().quality, 80);
    }
}
