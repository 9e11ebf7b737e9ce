use std::path::PathBuf;

use anyhow::Context;
use base64::Engine;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tether_common::protocol::{ImageFormat, ScreenshotOptions, Target};
use tether_engine::{CdpRemote, ConfigLoader, RemoteControl, TetherConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tether", version, about = "Drive a running editor over its debugging port")]
struct Args {
    /// Config file (defaults to ./tether.yaml, then ~/.tether/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debugging endpoint host
    #[arg(long)]
    host: Option<String>,

    /// Debugging endpoint port
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether the debugging endpoint answers
    Status,
    /// List debuggable targets and the one that would be driven
    Targets,
    /// Capture the editor window
    Screenshot {
        /// png, jpeg or webp
        #[arg(long)]
        format: Option<ImageFormat>,
        /// Compression quality (jpeg/webp)
        #[arg(long)]
        quality: Option<u8>,
        /// Write the decoded image here instead of printing base64
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print viewport geometry
    Metrics,
    /// Type text one character at a time
    Type { text: String },
    /// Insert text in one step and press Enter
    Send {
        text: String,
        /// Focus the chat input first
        #[arg(long)]
        focus: bool,
    },
    /// Focus the chat input
    Focus,
    /// Extract recent chat messages
    Chat,
    /// Dump the agent panel's visible text
    Panel,
    /// Dump the rendered conversation
    Conversation,
    /// Guess the open workspace root
    Workspace,
}

#[derive(Serialize)]
struct TargetListing {
    targets: Vec<Target>,
    selected: Option<String>,
}

#[derive(Serialize)]
struct SavedScreenshot {
    format: ImageFormat,
    path: PathBuf,
    bytes: usize,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn load_config(args: &Args) -> anyhow::Result<TetherConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = ConfigLoader::load_from(path)
                .await
                .with_context(|| format!("loading {}", path.display()))?;
            ConfigLoader::apply_env(&mut config, |name| std::env::var(name).ok())?;
            config
        }
        None => ConfigLoader::load_default().await?,
    };
    if let Some(host) = &args.host {
        config.endpoint.host = host.clone();
    }
    if let Some(port) = args.port {
        config.endpoint.port = port;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON result.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args).await?;
    tracing::debug!(host = %config.endpoint.host, port = config.endpoint.port, "using endpoint");
    let remote = CdpRemote::from_config(config)?;

    match args.command {
        Command::Status => print_json(&remote.check_availability().await)?,
        Command::Targets => {
            let targets = remote.list_targets().await?;
            let selected = remote.editor_target().await.ok().map(|t| t.id);
            print_json(&TargetListing { targets, selected })?;
        }
        Command::Screenshot {
            format,
            quality,
            out,
        } => {
            let defaults = remote.config().screenshot;
            let options = ScreenshotOptions {
                format: format.unwrap_or(defaults.format),
                quality: quality.unwrap_or(defaults.quality),
            };
            let shot = remote.screenshot(Some(options)).await?;
            match out {
                Some(path) => {
                    let bytes = base64::engine::general_purpose::STANDARD
                        .decode(&shot.data)
                        .context("screenshot payload is not valid base64")?;
                    tokio::fs::write(&path, &bytes)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    print_json(&SavedScreenshot {
                        format: shot.format,
                        path,
                        bytes: bytes.len(),
                    })?;
                }
                None => print_json(&shot)?,
            }
        }
        Command::Metrics => print_json(&remote.layout_metrics().await?)?,
        Command::Type { text } => {
            remote.type_text(&text).await?;
            print_json(&serde_json::json!({"typed": text.chars().count()}))?;
        }
        Command::Send { text, focus } => {
            if focus {
                let outcome = remote.focus_input().await?;
                tracing::info!(strategy = ?outcome, "focused before send");
            }
            remote.insert_and_submit(&text).await?;
            print_json(&serde_json::json!({"sent": text.chars().count()}))?;
        }
        Command::Focus => print_json(&serde_json::json!({"strategy": remote.focus_input().await?}))?,
        Command::Chat => print_json(&remote.chat_messages().await?)?,
        Command::Panel => print_json(&remote.agent_panel_content().await?)?,
        Command::Conversation => print_json(&remote.conversation_text().await?)?,
        Command::Workspace => {
            print_json(&serde_json::json!({"workspace": remote.workspace_path().await?}))?
        }
    }

    Ok(())
}
