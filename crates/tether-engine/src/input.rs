use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use serde::Deserialize;
use serde_json::json;
use tether_cdp::Session;
use tether_common::TetherError;
use tether_common::protocol::FocusOutcome;
use tether_snippets::{FOCUS_JS, invocation};
use tracing::debug;

use crate::extraction::decode_or_default;
use crate::selectors::Selectors;

/// What the focus snippet does once no input area can be focused directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusFallback {
    /// Click the input container. Used before typing.
    Click,
    /// Dispatch the focus shortcut at the document root.
    Shortcut,
}

impl FocusFallback {
    fn as_str(&self) -> &'static str {
        match self {
            FocusFallback::Click => "click",
            FocusFallback::Shortcut => "shortcut",
        }
    }
}

#[derive(Debug, Deserialize)]
struct FocusReply {
    strategy: FocusOutcome,
    #[serde(default)]
    selector: Option<String>,
}

impl Default for FocusReply {
    fn default() -> Self {
        Self {
            strategy: FocusOutcome::None,
            selector: None,
        }
    }
}

pub async fn focus(
    session: &Session,
    selectors: &Selectors,
    fallback: FocusFallback,
) -> Result<FocusOutcome, TetherError> {
    let params = json!({
        "inputSelectors": selectors.text_inputs,
        "editableSelectors": selectors.editables,
        "clickSelectors": selectors.click_targets,
        "fallback": fallback.as_str(),
        "shortcut": selectors.focus_shortcut,
    });
    let value = session.evaluate(&invocation(FOCUS_JS, &params)).await?;
    let reply: FocusReply = decode_or_default(value)?;
    debug!(strategy = ?reply.strategy, selector = ?reply.selector, "focus attempted");
    Ok(reply.strategy)
}

fn key_event(
    event_type: DispatchKeyEventType,
    key: &str,
    text: Option<&str>,
) -> Result<DispatchKeyEventParams, TetherError> {
    let mut builder = DispatchKeyEventParams::builder().r#type(event_type).key(key);
    if let Some(text) = text {
        builder = builder.text(text);
    }
    builder.build().map_err(TetherError::protocol)
}

/// One key-down (carrying the character as text) and key-up per character.
pub async fn type_characters(session: &Session, text: &str) -> Result<(), TetherError> {
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let key: &str = ch.encode_utf8(&mut buf);
        session
            .execute(key_event(DispatchKeyEventType::KeyDown, key, Some(key))?)
            .await?;
        session
            .execute(key_event(DispatchKeyEventType::KeyUp, key, None)?)
            .await?;
    }
    Ok(())
}

fn enter_event(down: bool) -> Result<DispatchKeyEventParams, TetherError> {
    let event_type = if down {
        DispatchKeyEventType::KeyDown
    } else {
        DispatchKeyEventType::KeyUp
    };
    let mut builder = DispatchKeyEventParams::builder()
        .r#type(event_type)
        .key("Enter")
        .code("Enter")
        .windows_virtual_key_code(13);
    if down {
        builder = builder.text("\r");
    }
    builder.build().map_err(TetherError::protocol)
}

pub async fn press_enter(session: &Session) -> Result<(), TetherError> {
    session.execute(enter_event(true)?).await?;
    session.execute(enter_event(false)?).await?;
    Ok(())
}

/// Insert the whole text at the caret, wait `settle`, then submit with Enter.
pub async fn insert_and_submit(
    session: &Session,
    text: &str,
    settle: Duration,
) -> Result<(), TetherError> {
    session.execute(InsertTextParams::new(text)).await?;
    tokio::time::sleep(settle).await;
    press_enter(session).await
}
