use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::session::identity_from_jar;
use crate::error::AppError;
use crate::search::index::{SearchIndex, SearchOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Axum handler for `GET /api/v1/search?q=`.
///
/// Fetches the page snapshot and runs the linear scan; admin-only pages
/// are invisible to anonymous callers.
pub async fn search_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    axum::extract::Query(params): axum::extract::Query<SearchParams>,
) -> Result<Json<SearchOutcome>, AppError> {
    let pages = state.pages.list_all().await?;
    let viewer = identity_from_jar(&jar);
    let index = SearchIndex::build(&pages);
    Ok(Json(index.query(&params.q, viewer.as_ref())))
}
