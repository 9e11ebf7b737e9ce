use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, GetLayoutMetricsParams,
};
use serde_json::Value;
use tether_cdp::{Session, TargetDirectory};
use tether_common::TetherError;
use tether_common::classifier::TextClassifier;
use tether_common::protocol::{
    AvailabilityReport, ChatExtraction, FocusOutcome, ImageFormat, PanelContent, Screenshot,
    ScreenshotOptions, Target,
};
use tether_common::selection::TargetPolicy;
use tracing::{info, warn};

use crate::backend::RemoteControl;
use crate::config::TetherConfig;
use crate::input::{self, FocusFallback};
use crate::{extraction, locator};

/// [`RemoteControl`] over the DevTools protocol.
///
/// Holds no connection between calls. Every operation selects the editor
/// target afresh, opens its own session and closes it before returning,
/// whether or not the operation succeeded.
pub struct CdpRemote {
    directory: TargetDirectory,
    config: TetherConfig,
    policy: TargetPolicy,
    classifier: TextClassifier,
}

impl CdpRemote {
    pub fn from_config(config: TetherConfig) -> Result<Self, TetherError> {
        let directory = TargetDirectory::new(
            &config.endpoint.host,
            config.endpoint.port,
            config.endpoint.discovery_timeout(),
        )?;
        Ok(Self::new(directory, config))
    }

    pub fn new(directory: TargetDirectory, config: TetherConfig) -> Self {
        let policy = config.targets.policy();
        Self {
            directory,
            config,
            policy,
            classifier: TextClassifier::standard().clone(),
        }
    }

    /// Replace the chat text classifier (e.g. with extra rejection rules).
    pub fn with_classifier(mut self, classifier: TextClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &TetherConfig {
        &self.config
    }

    pub fn directory(&self) -> &TargetDirectory {
        &self.directory
    }

    pub async fn editor_target(&self) -> Result<Target, TetherError> {
        self.directory.select_editor_target(&self.policy).await
    }

    async fn open_editor_session(&self) -> Result<(Target, Session), TetherError> {
        let target = self.editor_target().await?;
        let session = Session::open(&target, self.config.session.request_timeout()).await?;
        Ok((target, session))
    }
}

fn capture_format(format: ImageFormat) -> CaptureScreenshotFormat {
    match format {
        ImageFormat::Png => CaptureScreenshotFormat::Png,
        ImageFormat::Jpeg => CaptureScreenshotFormat::Jpeg,
        ImageFormat::Webp => CaptureScreenshotFormat::Webp,
    }
}

#[async_trait]
impl RemoteControl for CdpRemote {
    async fn check_availability(&self) -> AvailabilityReport {
        match self.directory.version().await {
            Ok(version) => AvailabilityReport::up(version.browser),
            Err(e) => {
                warn!(error = %e, "editor not reachable");
                AvailabilityReport::down(e.to_string())
            }
        }
    }

    async fn list_targets(&self) -> Result<Vec<Target>, TetherError> {
        self.directory.list_targets().await
    }

    async fn screenshot(&self, options: Option<ScreenshotOptions>) -> Result<Screenshot, TetherError> {
        let options = options.unwrap_or(self.config.screenshot);
        let params = CaptureScreenshotParams::builder()
            .format(capture_format(options.format))
            .quality(i64::from(options.quality))
            .build();

        let (target, session) = self.open_editor_session().await?;
        let result = session.execute(params).await;
        session.close().await;

        let reply = result?;
        let data = reply
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| TetherError::protocol("screenshot reply without data"))?
            .to_string();
        info!(target = %target.id, format = options.format.as_str(), bytes = data.len(), "captured screenshot");
        Ok(Screenshot {
            format: options.format,
            data,
        })
    }

    async fn layout_metrics(&self) -> Result<Value, TetherError> {
        let (_, session) = self.open_editor_session().await?;
        let result = session.execute(GetLayoutMetricsParams::default()).await;
        session.close().await;
        result
    }

    async fn type_text(&self, text: &str) -> Result<(), TetherError> {
        let (target, session) = self.open_editor_session().await?;
        let result = async {
            let outcome = input::focus(&session, &self.config.selectors, FocusFallback::Click).await?;
            if outcome == FocusOutcome::None {
                warn!("no input area found, typing into current focus");
            }
            input::type_characters(&session, text).await
        }
        .await;
        session.close().await;

        if result.is_ok() {
            info!(target = %target.id, chars = text.chars().count(), "typed text");
        }
        result
    }

    async fn insert_and_submit(&self, text: &str) -> Result<(), TetherError> {
        let (target, session) = self.open_editor_session().await?;
        let result =
            input::insert_and_submit(&session, text, self.config.session.settle_delay()).await;
        session.close().await;

        if result.is_ok() {
            info!(target = %target.id, chars = text.chars().count(), "submitted text");
        }
        result
    }

    async fn focus_input(&self) -> Result<FocusOutcome, TetherError> {
        let (_, session) = self.open_editor_session().await?;
        let result = input::focus(&session, &self.config.selectors, FocusFallback::Shortcut).await;
        session.close().await;
        result
    }

    async fn chat_messages(&self) -> Result<ChatExtraction, TetherError> {
        let (_, session) = self.open_editor_session().await?;
        let result = extraction::chat_messages(
            &session,
            &self.config.selectors,
            &self.classifier,
            &self.config.extraction,
        )
        .await;
        session.close().await;

        if let Ok(chat) = &result {
            info!(returned = chat.messages.len(), total = chat.total, "extracted chat messages");
        }
        result
    }

    async fn agent_panel_content(&self) -> Result<PanelContent, TetherError> {
        let (_, session) = self.open_editor_session().await?;
        let result =
            extraction::agent_panel_content(&session, &self.config.selectors, &self.config.extraction)
                .await;
        session.close().await;
        result
    }

    async fn conversation_text(&self) -> Result<PanelContent, TetherError> {
        let (_, session) = self.open_editor_session().await?;
        let result =
            extraction::conversation_text(&session, &self.config.selectors, &self.config.extraction)
                .await;
        session.close().await;
        result
    }

    async fn workspace_path(&self) -> Result<Option<String>, TetherError> {
        let (target, session) = self.open_editor_session().await?;
        let result = locator::workspace_path(
            &session,
            &target,
            &self.config.selectors,
            &self.config.targets.product_name,
        )
        .await;
        session.close().await;
        result
    }
}
