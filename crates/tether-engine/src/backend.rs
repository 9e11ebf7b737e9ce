use async_trait::async_trait;
use serde_json::Value;
use tether_common::TetherError;
use tether_common::protocol::{
    AvailabilityReport, ChatExtraction, FocusOutcome, PanelContent, Screenshot, ScreenshotOptions,
    Target,
};

/// Everything the operator surface can ask of the running editor.
///
/// Each call is self-contained: implementations connect, act, and release
/// their connection before returning.
#[async_trait]
pub trait RemoteControl: Send + Sync {
    /// Probe the discovery endpoint. Failures are reported in the value.
    async fn check_availability(&self) -> AvailabilityReport;

    async fn list_targets(&self) -> Result<Vec<Target>, TetherError>;

    /// Capture the editor surface. `None` uses the configured defaults.
    async fn screenshot(&self, options: Option<ScreenshotOptions>) -> Result<Screenshot, TetherError>;

    /// Raw `Page.getLayoutMetrics` geometry.
    async fn layout_metrics(&self) -> Result<Value, TetherError>;

    /// Focus the chat input and type `text` one key event pair per character.
    async fn type_text(&self, text: &str) -> Result<(), TetherError>;

    /// Insert `text` in one step and press Enter.
    async fn insert_and_submit(&self, text: &str) -> Result<(), TetherError>;

    async fn focus_input(&self) -> Result<FocusOutcome, TetherError>;

    async fn chat_messages(&self) -> Result<ChatExtraction, TetherError>;

    async fn agent_panel_content(&self) -> Result<PanelContent, TetherError>;

    async fn conversation_text(&self) -> Result<PanelContent, TetherError>;

    /// Best-effort workspace root; `None` when nothing recognizable is open.
    async fn workspace_path(&self) -> Result<Option<String>, TetherError>;
}
