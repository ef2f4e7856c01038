use crate::auth::models::{AccessLevel, Identity};
use crate::db::models::Page;

/// Outcome of the client-facing access check.
///
/// The gate runs after the page has been fetched; the store's own rule
/// engine is the security boundary, this only keeps restricted content
/// from flashing before a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the page for this viewer.
    Render,
    /// Send the viewer elsewhere instead of rendering.
    Redirect { location: String },
}

/// Decide whether `viewer` may see `page`.
pub fn check_access(page: &Page, viewer: Option<&Identity>) -> GateDecision {
    match page.access() {
        AccessLevel::Admin if viewer.is_none() => GateDecision::Redirect {
            location: "/".to_string(),
        },
        _ => GateDecision::Render,
    }
}
