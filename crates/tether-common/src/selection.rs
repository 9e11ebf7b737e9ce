//! Editor target disambiguation.
//!
//! Matching is plain, case-sensitive title substring matching against what the
//! editor currently renders in its window titles. It breaks whenever the
//! product renames a surface, so every rule is a separate predicate that can
//! be swapped without touching discovery or transport code.

use crate::error::TetherError;
use crate::protocol::Target;

#[derive(Debug, Clone)]
pub struct TargetPolicy {
    pub product_name: String,
    /// Title fragments of secondary surfaces (launch screen, etc.).
    pub secondary_markers: Vec<String>,
    /// Title fragments identifying the protocol's own inspector windows.
    pub inspector_markers: Vec<String>,
}

impl Default for TargetPolicy {
    fn default() -> Self {
        Self {
            product_name: "Antigravity".to_string(),
            secondary_markers: vec!["Launchpad".to_string()],
            inspector_markers: vec!["DevTools".to_string()],
        }
    }
}

impl TargetPolicy {
    pub fn is_page(&self, target: &Target) -> bool {
        target.is_page()
    }

    pub fn is_inspector(&self, target: &Target) -> bool {
        target.url.starts_with("devtools://")
            || self
                .inspector_markers
                .iter()
                .any(|marker| target.title.contains(marker.as_str()))
    }

    pub fn is_secondary_surface(&self, target: &Target) -> bool {
        self.secondary_markers
            .iter()
            .any(|marker| target.title.contains(marker.as_str()))
    }

    pub fn is_editor_surface(&self, target: &Target) -> bool {
        self.is_page(target)
            && target.title.contains(self.product_name.as_str())
            && !self.is_secondary_surface(target)
            && !self.is_inspector(target)
    }

    /// Pick the main editor window: a product-titled page first, then any page.
    pub fn select<'a>(&self, targets: &'a [Target]) -> Result<&'a Target, TetherError> {
        targets
            .iter()
            .find(|t| self.is_editor_surface(t))
            .or_else(|| targets.iter().find(|t| self.is_page(t)))
            .ok_or(TetherError::NoEditorTarget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: &str, kind: &str, title: &str, url: &str) -> Target {
        Target {
            id: id.to_string(),
            target_type: kind.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            description: None,
            devtools_frontend_url: None,
            web_socket_debugger_url: Some(format!("ws://127.0.0.1:9222/devtools/page/{}", id)),
        }
    }

    #[test]
    fn test_prefers_project_window_over_launchpad() {
        let targets = vec![
            target("L", "page", "Antigravity - Launchpad", "app://launchpad"),
            target("M", "page", "MyProject - Antigravity", "app://workbench"),
        ];
        let selected = TargetPolicy::default().select(&targets).unwrap();
        assert_eq!(selected.id, "M");
    }

    #[test]
    fn test_skips_inspector_windows() {
        let targets = vec![
            target("D", "page", "DevTools - Antigravity", "devtools://devtools/bundled/inspector.html"),
            target("M", "page", "MyProject - Antigravity", "app://workbench"),
        ];
        assert_eq!(TargetPolicy::default().select(&targets).unwrap().id, "M");
    }

    #[test]
    fn test_falls_back_to_first_page() {
        let targets = vec![
            target("W", "service_worker", "sw", "app://sw.js"),
            target("P1", "page", "Untitled", "app://a"),
            target("P2", "page", "Other", "app://b"),
        ];
        assert_eq!(TargetPolicy::default().select(&targets).unwrap().id, "P1");
    }

    #[test]
    fn test_no_page_targets() {
        let targets = vec![target("W", "worker", "Antigravity", "app://w.js")];
        assert!(matches!(
            TargetPolicy::default().select(&targets),
            Err(TetherError::NoEditorTarget)
        ));
        assert!(matches!(
            TargetPolicy::default().select(&[]),
            Err(TetherError::NoEditorTarget)
        ));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let targets = vec![
            target("A", "page", "myproject - antigravity", "app://a"),
            target("B", "page", "MyProject - Antigravity", "app://b"),
        ];
        assert_eq!(TargetPolicy::default().select(&targets).unwrap().id, "B");
    }
}
