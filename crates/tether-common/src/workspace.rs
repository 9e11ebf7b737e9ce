//! Path heuristics for guessing the open project root.
//!
//! Tab labels look like `/Users/alice/proj/src/main.rs - proj` or
//! `C:\work\proj\main.rs • Modified`, and resource attributes carry raw
//! `file://` URIs. None of this is a stable format; each step returns `None`
//! rather than guessing when the input does not fit.

use std::sync::LazyLock;

use regex::Regex;

pub const UNIX_ROOTS: &[&str] = &["/home/", "/Users/", "/var/", "/opt/"];

/// A path embedded in a label ends at the first of these.
const DELIMITERS: &[&str] = &[" - ", " — ", "•", "\n", "\"", "(", ")", ","];

/// Drive letter not glued to a preceding word (`https://` must not match).
static WINDOWS_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9])([A-Za-z]:[\\/])").expect("drive letter pattern compiles")
});

static DRIVE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:[\\/]").expect("drive prefix pattern compiles"));

/// Where a path was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    TabLabel,
    FileUri,
}

/// Project name from a `Name - Product` window title.
///
/// With several ` - ` separated parts (`file.rs - Name - Product`) the part
/// immediately before the product suffix is used.
pub fn project_name_from_title(title: &str, product: &str) -> Option<String> {
    let suffix = format!(" - {}", product);
    let head = title.strip_suffix(suffix.as_str())?;
    let name = head.rsplit(" - ").next()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Extract a filesystem path embedded in a tab label.
pub fn path_from_label(label: &str) -> Option<String> {
    let start = WINDOWS_PATH
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.start())
        .or_else(|| unix_path_start(label))?;

    let tail = &label[start..];
    let end = DELIMITERS
        .iter()
        .filter_map(|d| tail.find(d))
        .min()
        .unwrap_or(tail.len());
    let path = tail[..end].trim_end();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// Earliest Unix root that starts a path of its own rather than sitting inside a URL.
fn unix_path_start(label: &str) -> Option<usize> {
    UNIX_ROOTS
        .iter()
        .flat_map(|root| label.match_indices(root).map(|(idx, _)| idx))
        .filter(|&idx| starts_standalone_path(label, idx))
        .min()
}

fn starts_standalone_path(label: &str, idx: usize) -> bool {
    let before = &label[..idx];
    match before.chars().next_back() {
        None => true,
        Some(c) if c.is_whitespace() || matches!(c, '"' | '\'' | '(') => {
            let token = before.rsplit(char::is_whitespace).next().unwrap_or("");
            !token.contains("://")
        }
        Some(_) => false,
    }
}

/// Decode a `file://` URI into a local path.
pub fn path_from_file_uri(uri: &str) -> Option<String> {
    let raw = uri.trim().strip_prefix("file://")?;
    let decoded = urlencoding::decode(raw).ok()?.into_owned();
    // file:///c%3A/work -> /c:/work -> c:/work
    let path = match decoded.strip_prefix('/') {
        Some(rest) if DRIVE_PREFIX.is_match(rest) => rest.to_string(),
        _ => decoded,
    };
    if path.is_empty() { None } else { Some(path) }
}

/// Reduce a file path to its workspace root.
///
/// With a known project name the path is cut after the first segment equal to
/// it (case-insensitive); otherwise the final segment is dropped.
pub fn workspace_root(file_path: &str, project_name: Option<&str>) -> Option<String> {
    let separator = if file_path.contains('\\') { '\\' } else { '/' };
    let segments: Vec<&str> = file_path.split(['/', '\\']).collect();

    if let Some(project) = project_name {
        if let Some(idx) = segments
            .iter()
            .position(|segment| !segment.is_empty() && segment.eq_ignore_ascii_case(project))
        {
            return Some(join_segments(&segments[..=idx], separator));
        }
    }

    if segments.len() < 2 {
        return None;
    }
    let root = join_segments(&segments[..segments.len() - 1], separator);
    if root.is_empty() { None } else { Some(root) }
}

fn join_segments(segments: &[&str], separator: char) -> String {
    segments.join(&separator.to_string())
}

/// Run the full inference over collected tab labels and URIs.
pub fn infer_workspace(
    labels: &[String],
    uris: &[String],
    project_name: Option<&str>,
) -> Option<(String, PathSource)> {
    let (file_path, source) = labels
        .iter()
        .find_map(|label| path_from_label(label))
        .map(|p| (p, PathSource::TabLabel))
        .or_else(|| {
            uris.iter()
                .find_map(|uri| path_from_file_uri(uri))
                .map(|p| (p, PathSource::FileUri))
        })?;
    workspace_root(&file_path, project_name).map(|root| (root, source))
}
