use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::auth::session::identity_from_jar;
use crate::error::AppError;
use crate::pages::gate::{check_access, GateDecision};
use crate::pages::lookup::locate_page;
use crate::rendering::view::{home_document, not_found_document, page_document, render_page, RenderedBody};
use crate::search::index::{SearchIndex, SearchOutcome};
use crate::state::AppState;

/// Axum handler for `GET /{*path}` — the public page renderer.
///
/// Resolves through both id schemes, gates on the declared access level,
/// then dispatches on the content kind. Unknown paths get a 404 document
/// rather than a JSON error.
pub async fn view_page_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    axum::extract::Path(path): axum::extract::Path<String>,
) -> Result<Response, AppError> {
    let full_path = path.trim_matches('/').to_string();
    if full_path.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let located = match locate_page(state.pages.as_ref(), &full_path).await? {
        Some(located) => located,
        None => {
            return Ok((
                StatusCode::NOT_FOUND,
                Html(not_found_document(&full_path)),
            )
                .into_response());
        }
    };

    let viewer = identity_from_jar(&jar);
    let page = located.into_page();

    if let GateDecision::Redirect { location } = check_access(&page, viewer.as_ref()) {
        return Ok(Redirect::to(&location).into_response());
    }

    let view = render_page(&page);
    match &view.body {
        RenderedBody::Redirect(target) => Ok(Redirect::temporary(&target.location).into_response()),
        RenderedBody::Content { .. } => {
            let document = page_document(&view, viewer.is_some());
            Ok(Html(document).into_response())
        }
    }
}

/// Axum handler for `GET /` — the browse tree of everything the viewer
/// may see.
pub async fn home_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, AppError> {
    let pages = state.pages.list_all().await?;
    let viewer = identity_from_jar(&jar);
    let index = SearchIndex::build(&pages);

    let tree = match index.query("", viewer.as_ref()) {
        SearchOutcome::Results { tree } => tree,
        SearchOutcome::Placeholder => Vec::new(),
    };

    Ok(Html(home_document(&tree)))
}
