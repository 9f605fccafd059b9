//! View routing.
//!
//! The register has four surfaces. Every command is routed through
//! [`ViewRouter`] so the same role gates apply however a surface is reached.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::RecordPatch;
use crate::session::Role;

/// What the editor is working on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "id")]
pub enum EditorTarget {
    /// A record that does not exist yet.
    New,
    /// The record with this id.
    Existing(String),
}

/// An application surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Statistics overview.
    Dashboard,
    /// Record list and search.
    RecordList,
    /// Record editor (admin only).
    Editor(EditorTarget),
    /// AI legal assistant.
    Assistant,
}

impl View {
    /// Navigation label of the surface.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "BERANDA",
            Self::RecordList => "DATABASE",
            Self::Editor(_) => "INPUT",
            Self::Assistant => "AI HUKUM",
        }
    }

    /// Whether reaching this surface needs the admin role.
    #[must_use]
    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::Editor(_))
    }

    /// Surfaces offered in the navigation bar for `role`.
    #[must_use]
    pub fn menu(role: Role) -> Vec<View> {
        let mut views = vec![Self::Dashboard, Self::RecordList];
        if role == Role::Admin {
            views.push(Self::Editor(EditorTarget::New));
        }
        views.push(Self::Assistant);
        views
    }
}

/// Tracks the active surface and the editor's staged draft.
#[derive(Debug)]
pub struct ViewRouter {
    current: View,
    draft: Option<RecordPatch>,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    /// Start on the dashboard.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: View::Dashboard,
            draft: None,
        }
    }

    /// The active surface.
    #[must_use]
    pub fn current(&self) -> &View {
        &self.current
    }

    /// Switch to `target`.
    ///
    /// Leaving the editor discards the staged draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a role and
    /// [`Error::AccessRestricted`] when a viewer asks for the editor. The
    /// active surface is unchanged on error.
    pub fn navigate(&mut self, target: View, role: Option<Role>) -> Result<&View> {
        let role = role.ok_or(Error::NotLoggedIn)?;
        if target.requires_admin() && role != Role::Admin {
            return Err(Error::restricted("open editor"));
        }

        if self.current != target {
            if matches!(self.current, View::Editor(_)) {
                self.draft = None;
            }
            debug!("View {} -> {}", self.current.label(), target.label());
            self.current = target;
        }
        Ok(&self.current)
    }

    /// Stage field values in the editor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] when the editor is not the active surface.
    pub fn stage(&mut self, patch: RecordPatch) -> Result<()> {
        if !matches!(self.current, View::Editor(_)) {
            return Err(Error::internal("no editor is open"));
        }
        self.draft = Some(patch);
        Ok(())
    }

    /// The staged draft, if any.
    #[must_use]
    pub fn draft(&self) -> Option<&RecordPatch> {
        self.draft.as_ref()
    }

    /// Return to the dashboard and drop any draft, as after logout.
    pub fn reset(&mut self) {
        self.current = View::Dashboard;
        self.draft = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(nama: &str) -> RecordPatch {
        RecordPatch {
            nama: Some(nama.to_string()),
            ..RecordPatch::default()
        }
    }

    #[test]
    fn test_starts_on_dashboard() {
        let router = ViewRouter::new();
        assert_eq!(router.current(), &View::Dashboard);
        assert!(router.draft().is_none());
    }

    #[test]
    fn test_navigation_requires_role() {
        let mut router = ViewRouter::new();
        let err = router.navigate(View::RecordList, None).unwrap_err();
        assert!(matches!(err, Error::NotLoggedIn));
        assert_eq!(router.current(), &View::Dashboard);
    }

    #[test]
    fn test_viewer_cannot_open_editor() {
        let mut router = ViewRouter::new();
        router
            .navigate(View::RecordList, Some(Role::Viewer))
            .unwrap();

        let err = router
            .navigate(View::Editor(EditorTarget::New), Some(Role::Viewer))
            .unwrap_err();
        assert!(matches!(err, Error::AccessRestricted { .. }));
        assert_eq!(router.current(), &View::RecordList);
    }

    #[test]
    fn test_viewer_reaches_read_surfaces() {
        let mut router = ViewRouter::new();
        for view in [View::RecordList, View::Assistant, View::Dashboard] {
            assert_eq!(
                router.navigate(view.clone(), Some(Role::Viewer)).unwrap(),
                &view
            );
        }
    }

    #[test]
    fn test_admin_opens_editor_for_existing_record() {
        let mut router = ViewRouter::new();
        let target = View::Editor(EditorTarget::Existing("42".to_string()));
        router.navigate(target.clone(), Some(Role::Admin)).unwrap();
        assert_eq!(router.current(), &target);
        assert_eq!(router.current().label(), "INPUT");
    }

    #[test]
    fn test_leaving_editor_discards_draft() {
        let mut router = ViewRouter::new();
        router
            .navigate(View::Editor(EditorTarget::New), Some(Role::Admin))
            .unwrap();
        router.stage(patch("Budi")).unwrap();
        assert!(router.draft().is_some());

        router
            .navigate(View::RecordList, Some(Role::Admin))
            .unwrap();
        assert!(router.draft().is_none());
    }

    #[test]
    fn test_staying_in_editor_keeps_draft() {
        let mut router = ViewRouter::new();
        let editor = View::Editor(EditorTarget::New);
        router.navigate(editor.clone(), Some(Role::Admin)).unwrap();
        router.stage(patch("Budi")).unwrap();
        router.navigate(editor, Some(Role::Admin)).unwrap();
        assert_eq!(router.draft(), Some(&patch("Budi")));
    }

    #[test]
    fn test_stage_outside_editor_rejected() {
        let mut router = ViewRouter::new();
        assert!(router.stage(patch("Budi")).is_err());
    }

    #[test]
    fn test_labels_and_menu() {
        assert_eq!(View::Dashboard.label(), "BERANDA");
        assert_eq!(View::RecordList.label(), "DATABASE");
        assert_eq!(View::Assistant.label(), "AI HUKUM");
        assert_eq!(View::menu(Role::Viewer).len(), 3);
        assert!(View::menu(Role::Admin).contains(&View::Editor(EditorTarget::New)));
    }

    #[test]
    fn test_reset_returns_to_dashboard() {
        let mut router = ViewRouter::new();
        router
            .navigate(View::Editor(EditorTarget::New), Some(Role::Admin))
            .unwrap();
        router.stage(patch("Budi")).unwrap();
        router.reset();
        assert_eq!(router.current(), &View::Dashboard);
        assert!(router.draft().is_none());
    }
}
