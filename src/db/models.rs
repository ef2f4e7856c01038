use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::models::AccessLevel;

/// A content page stored in the `pages` collection.
///
/// Wire field names are camelCase so documents written by the historical
/// client remain readable without a migration pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Canonical document id: the full path with `/` replaced by `|`.
    ///
    /// Legacy documents carry an auto-generated id here instead and are
    /// found through their `fullPath` field.
    #[serde(rename = "_id")]
    pub id: String,
    /// Human-readable title, also used for the browser tab.
    pub title: String,
    /// Leaf segment of the path, never empty.
    pub name: String,
    /// Parent directory, starting with `/` and not ending with one
    /// (except root `/`).
    pub path: String,
    /// `path` and `name` joined, no leading slash.
    pub full_path: String,
    /// Content, adjacently tagged as `{type, content}` on the wire.
    #[serde(flatten)]
    pub body: PageBody,
    /// Raw declared access level. Read through [`Page::access`]; legacy
    /// documents stored this under `access-level`.
    #[serde(default, alias = "access-level", skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<String>,
}

impl Page {
    /// Effective access level: parsed case-insensitively from whichever
    /// historical field the document carries, defaulting to public.
    pub fn access(&self) -> AccessLevel {
        self.access_level
            .as_deref()
            .and_then(AccessLevel::from_str_ci)
            .unwrap_or(AccessLevel::Public)
    }
}

/// Page content, dispatched on the stored `type` discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum PageBody {
    /// Markdown source, rendered to HTML on view.
    Markdown(String),
    /// Raw HTML, injected verbatim (trusted-author model).
    Html(String),
    /// Ordered list of downloadable entries.
    Files(Vec<FileEntry>),
    /// Redirect destination: absolute when it begins with `http`,
    /// site-relative otherwise.
    Redirection(String),
}

impl PageBody {
    /// The wire discriminant for this body.
    pub fn kind(&self) -> &'static str {
        match self {
            PageBody::Markdown(_) => "markdown",
            PageBody::Html(_) => "html",
            PageBody::Files(_) => "files",
            PageBody::Redirection(_) => "redirection",
        }
    }

    /// Whether this body is editable text (markdown or raw HTML).
    pub fn is_text(&self) -> bool {
        matches!(self, PageBody::Markdown(_) | PageBody::Html(_))
    }
}

/// One downloadable entry of a `files` page, as returned by the CDN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub url: String,
    pub bytes: u64,
    pub format: String,
}

/// A feedback submission stored in the `feedback` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// Free-text page label typed by the submitter.
    pub page: String,
    pub name: String,
    pub contact: String,
    pub message: String,
    /// Page the form was opened from, `General` when none.
    pub related_page: String,
    pub ip: String,
    pub user_agent: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default)]
    pub resolved: bool,
    /// SHA-256 over message and source IP, used to drop duplicate
    /// submissions.
    pub content_hash: String,
}

/// A named HTML fragment from the `admin` collection, served verbatim on
/// the admin dashboard routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminShell {
    #[serde(rename = "_id")]
    pub name: String,
    pub html: String,
}
