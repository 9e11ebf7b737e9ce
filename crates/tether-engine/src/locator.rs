use serde::Deserialize;
use serde_json::json;
use tether_cdp::Session;
use tether_common::TetherError;
use tether_common::protocol::Target;
use tether_common::workspace::{infer_workspace, project_name_from_title};
use tether_snippets::{WORKSPACE_PROBE_JS, invocation};
use tracing::debug;

use crate::extraction::decode_or_default;
use crate::selectors::Selectors;

#[derive(Debug, Default, Deserialize)]
struct WorkspaceProbe {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    uris: Vec<String>,
}

/// Infer the workspace root from the editor title and whatever file paths the page exposes.
pub async fn workspace_path(
    session: &Session,
    target: &Target,
    selectors: &Selectors,
    product_name: &str,
) -> Result<Option<String>, TetherError> {
    let project = project_name_from_title(&target.title, product_name);

    let params = json!({
        "tabSelectors": selectors.tabs,
        "uriAttributes": selectors.uri_attributes,
    });
    let value = session
        .evaluate(&invocation(WORKSPACE_PROBE_JS, &params))
        .await?;
    let probe: WorkspaceProbe = decode_or_default(value)?;

    match infer_workspace(&probe.labels, &probe.uris, project.as_deref()) {
        Some((root, source)) => {
            debug!(root = %root, source = ?source, project = ?project, "workspace inferred");
            Ok(Some(root))
        }
        None => {
            debug!(
                labels = probe.labels.len(),
                uris = probe.uris.len(),
                "no workspace path recognized"
            );
            Ok(None)
        }
    }
}
