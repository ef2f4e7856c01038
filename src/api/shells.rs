use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::auth::session::identity_from_jar;
use crate::error::AppError;
use crate::state::AppState;

/// Axum handler for `GET /admin/{shell}`.
///
/// Admin dashboard pages keep their UI markup in the store's `admin`
/// collection so they can change without a redeploy; signed-in callers
/// get the fragment verbatim, everyone else is sent to the login page.
pub async fn admin_shell_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    axum::extract::Path(shell): axum::extract::Path<String>,
) -> Result<Response, AppError> {
    if identity_from_jar(&jar).is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let html = state
        .shells
        .find_html(&shell)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Admin shell '{shell}' not found")))?;

    Ok(Html(html).into_response())
}
