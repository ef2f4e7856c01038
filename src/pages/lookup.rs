use crate::db::models::Page;
use crate::db::repository::PageRepository;
use crate::error::AppError;
use crate::pages::path::derive_doc_id;

/// A page resolved through one of the two coexisting id schemes.
///
/// New-scheme documents are keyed by the id derived from their full path;
/// old-scheme documents carry an auto-generated id and are found by
/// querying the `fullPath` field. The variant matters to the save path:
/// canonical pages update in place, legacy pages migrate to the new
/// scheme on their next edit.
#[derive(Debug, Clone)]
pub enum LocatedPage {
    /// Found under the canonical derived id.
    Canonical(Page),
    /// Found only through the legacy `fullPath` query.
    Legacy(Page),
}

impl LocatedPage {
    pub fn page(&self) -> &Page {
        match self {
            LocatedPage::Canonical(page) | LocatedPage::Legacy(page) => page,
        }
    }

    pub fn into_page(self) -> Page {
        match self {
            LocatedPage::Canonical(page) | LocatedPage::Legacy(page) => page,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, LocatedPage::Legacy(_))
    }
}

/// Resolve a page by normalized full path, trying the new id scheme first
/// and falling back to the legacy `fullPath` scan.
///
/// For old-scheme documents the first match wins; historically at most one
/// page shares a `fullPath`, but nothing enforces that for legacy data.
pub async fn locate_page(
    repo: &dyn PageRepository,
    full_path: &str,
) -> Result<Option<LocatedPage>, AppError> {
    let doc_id = derive_doc_id(full_path);
    if let Some(page) = repo.find_by_id(&doc_id).await? {
        return Ok(Some(LocatedPage::Canonical(page)));
    }
    Ok(repo
        .find_by_full_path(full_path)
        .await?
        .map(LocatedPage::Legacy))
}

/// Like [`locate_page`], but a missing page is an error.
pub async fn require_page(
    repo: &dyn PageRepository,
    full_path: &str,
) -> Result<LocatedPage, AppError> {
    locate_page(repo, full_path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Page not found: /{full_path}")))
}
