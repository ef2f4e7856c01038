use axum::Json;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::models::AccessLevel;
use crate::auth::provider::AuthProvider;
use crate::auth::session::require_identity;
use crate::db::models::{Page, PageBody};
use crate::db::repository::{PagePatch, PageRepository};
use crate::error::AppError;
use crate::pages::lookup::{locate_page, require_page, LocatedPage};
use crate::pages::path::ResolvedPath;
use crate::state::AppState;

/// Request payload for creating a page.
///
/// `path` is the raw slash-delimited location including the leaf name,
/// exactly as typed; the body arrives adjacently tagged as
/// `{type, content}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    pub title: String,
    pub path: String,
    #[serde(flatten)]
    pub body: PageBody,
    #[serde(default)]
    pub access_level: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageResponse {
    pub message: String,
    pub full_path: String,
}

/// Normalize and validate a declared access level.
fn normalize_access_level(raw: Option<&str>) -> Result<Option<String>, AppError> {
    match raw {
        None => Ok(None),
        Some(value) => {
            let level = AccessLevel::from_str_ci(value).ok_or_else(|| {
                AppError::Validation(format!(
                    "Invalid access level '{value}'. Expected: public, admin"
                ))
            })?;
            Ok(Some(level.to_string()))
        }
    }
}

/// Core creation logic — separated from the HTTP layer for testability.
///
/// Resolves the path, probes both id schemes for an existing page, and
/// writes the new document. The probe-then-write pair is not atomic; two
/// concurrent creators can both pass the probe, and the store's unique
/// id index then rejects the second insert with the same conflict error.
pub async fn process_create_page(
    repo: &dyn PageRepository,
    request: CreatePageRequest,
    author: &str,
) -> Result<CreatePageResponse, AppError> {
    let resolved = ResolvedPath::parse(&request.path)?;
    let access_level = normalize_access_level(request.access_level.as_deref())?;

    if locate_page(repo, &resolved.full_path).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Page already exists at /{}",
            resolved.full_path
        )));
    }

    let page = Page {
        id: resolved.doc_id,
        title: request.title,
        name: resolved.name,
        path: resolved.path,
        full_path: resolved.full_path.clone(),
        body: request.body,
        access_level,
        created_at: Some(Utc::now()),
        created_by: Some(author.to_string()),
        last_edited_at: None,
        last_edited_by: None,
    };

    repo.create(page).await?;

    Ok(CreatePageResponse {
        message: format!("Page created at /{}", resolved.full_path),
        full_path: resolved.full_path,
    })
}

/// Page selector used by the edit and delete flows: `?path=<fullPath>`.
#[derive(Debug, Deserialize)]
pub struct PageSelector {
    pub path: String,
}

/// A page as handed to the edit form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResource {
    pub title: String,
    pub full_path: String,
    #[serde(flatten)]
    pub body: PageBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
    /// Whether the document still lives under its legacy id; saving will
    /// migrate it.
    pub legacy: bool,
}

/// Fetch a page for editing, resolving either id scheme.
pub async fn process_fetch_page(
    repo: &dyn PageRepository,
    full_path: &str,
) -> Result<PageResource, AppError> {
    let resolved = ResolvedPath::parse(full_path)?;
    let located = require_page(repo, &resolved.full_path).await?;
    let legacy = located.is_legacy();
    let page = located.into_page();

    Ok(PageResource {
        title: page.title,
        full_path: page.full_path,
        body: page.body,
        access_level: page.access_level,
        legacy,
    })
}

/// Request payload for the edit flow: a new title and replacement text
/// content. Only markdown and raw HTML pages are editable.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePageRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageResponse {
    pub message: String,
    pub full_path: String,
    /// True when the save migrated a legacy-id document.
    pub migrated: bool,
}

/// Core edit logic.
///
/// Canonical documents update in place. Legacy documents migrate: the
/// edited page is written under its canonical id, then the old document
/// is deleted. This is a create/delete pair, not a rename.
pub async fn process_update_page(
    repo: &dyn PageRepository,
    full_path: &str,
    request: UpdatePageRequest,
    editor: &str,
) -> Result<UpdatePageResponse, AppError> {
    let resolved = ResolvedPath::parse(full_path)?;
    let located = require_page(repo, &resolved.full_path).await?;

    let new_body = match &located.page().body {
        PageBody::Markdown(_) => PageBody::Markdown(request.content),
        PageBody::Html(_) => PageBody::Html(request.content),
        _ => {
            return Err(AppError::Validation(
                "Only markdown and HTML pages can be edited.".to_string(),
            ))
        }
    };

    match located {
        LocatedPage::Canonical(page) => {
            let patch = PagePatch {
                title: request.title,
                body: new_body,
                last_edited_by: editor.to_string(),
                last_edited_at: Utc::now(),
            };
            repo.update_content(&page.id, patch).await?;

            Ok(UpdatePageResponse {
                message: format!("Page updated at /{}", page.full_path),
                full_path: page.full_path,
                migrated: false,
            })
        }
        LocatedPage::Legacy(old) => {
            let migrated = Page {
                id: resolved.doc_id,
                title: request.title,
                name: resolved.name,
                path: resolved.path,
                full_path: resolved.full_path.clone(),
                body: new_body,
                access_level: old.access_level.clone(),
                created_at: old.created_at,
                created_by: old.created_by.clone(),
                last_edited_at: Some(Utc::now()),
                last_edited_by: Some(editor.to_string()),
            };

            // Create first so the page never disappears mid-migration.
            repo.create(migrated).await?;
            repo.delete(&old.id).await?;

            Ok(UpdatePageResponse {
                message: format!("Page updated at /{}", resolved.full_path),
                full_path: resolved.full_path,
                migrated: true,
            })
        }
    }
}

/// Request payload for deletion: the caller must re-authenticate.
#[derive(Debug, Deserialize)]
pub struct DeletePageRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct DeletePageResponse {
    pub message: String,
}

/// Core delete logic, after the caller has been re-authenticated.
pub async fn process_delete_page(
    repo: &dyn PageRepository,
    full_path: &str,
) -> Result<DeletePageResponse, AppError> {
    let resolved = ResolvedPath::parse(full_path)?;
    let located = require_page(repo, &resolved.full_path).await?;
    let page = located.into_page();

    repo.delete(&page.id).await?;

    Ok(DeletePageResponse {
        message: format!("Page /{} deleted", page.full_path),
    })
}

/// Axum handler for `POST /api/v1/pages`.
pub async fn create_page_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    Json(request): Json<CreatePageRequest>,
) -> Result<Json<CreatePageResponse>, AppError> {
    let identity = require_identity(&jar)?;
    let response = process_create_page(state.pages.as_ref(), request, &identity.email).await?;
    Ok(Json(response))
}

/// Axum handler for `GET /api/v1/pages?path=`.
pub async fn fetch_page_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    axum::extract::Query(selector): axum::extract::Query<PageSelector>,
) -> Result<Json<PageResource>, AppError> {
    require_identity(&jar)?;
    let response = process_fetch_page(state.pages.as_ref(), &selector.path).await?;
    Ok(Json(response))
}

/// Axum handler for `PUT /api/v1/pages?path=`.
pub async fn update_page_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    axum::extract::Query(selector): axum::extract::Query<PageSelector>,
    Json(request): Json<UpdatePageRequest>,
) -> Result<Json<UpdatePageResponse>, AppError> {
    let identity = require_identity(&jar)?;
    let response =
        process_update_page(state.pages.as_ref(), &selector.path, request, &identity.email)
            .await?;
    Ok(Json(response))
}

/// Axum handler for `DELETE /api/v1/pages?path=`.
///
/// Deletion is irreversible, so the session alone is not enough: the
/// caller's password is checked against the auth provider again.
pub async fn delete_page_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    axum::extract::Query(selector): axum::extract::Query<PageSelector>,
    Json(request): Json<DeletePageRequest>,
) -> Result<Json<DeletePageResponse>, AppError> {
    let identity = require_identity(&jar)?;
    reauthenticate(state.auth.as_ref(), &identity.email, &request.password).await?;
    let response = process_delete_page(state.pages.as_ref(), &selector.path).await?;
    Ok(Json(response))
}

async fn reauthenticate(
    auth: &dyn AuthProvider,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    auth.reauthenticate(email, password)
        .await
        .map_err(|_| AppError::Auth("Re-authentication failed".to_string()))
}
