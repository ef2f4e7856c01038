use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::models::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Name of the HTTP-only session cookie holding the serialized identity.
pub const SESSION_COOKIE: &str = "waypost_session";

/// Read the current identity from the session cookie, if any.
pub fn identity_from_jar(jar: &CookieJar) -> Option<Identity> {
    let cookie = jar.get(SESSION_COOKIE)?;
    serde_json::from_str(cookie.value()).ok()
}

/// Like [`identity_from_jar`], but an anonymous caller is an error.
pub fn require_identity(jar: &CookieJar) -> Result<Identity, AppError> {
    identity_from_jar(jar).ok_or_else(|| AppError::Auth("Not signed in".to_string()))
}

fn session_cookie(identity: &Identity) -> Result<Cookie<'static>, AppError> {
    let value = serde_json::to_string(identity)
        .map_err(|e| AppError::Internal(format!("Failed to serialize identity: {e}")))?;
    Ok(Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub identity: Identity,
}

/// `POST /api/auth/login` — verify credentials at the provider and start
/// a session.
pub async fn login_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let identity = state.auth.sign_in(&request.email, &request.password).await?;

    if !identity.email_verified {
        return Err(AppError::Auth(
            "Email not verified. Check your inbox for the verification link.".to_string(),
        ));
    }

    let jar = jar.add(session_cookie(&identity)?);

    Ok((
        jar,
        Json(LoginResponse {
            message: "Signed in".to_string(),
            identity,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub email: String,
}

/// `POST /api/auth/register` — create an account and send the
/// verification mail. No session is started; the account must verify
/// and sign in explicitly.
pub async fn register_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    if request.password != request.password_confirm {
        return Err(AppError::Validation("Passwords do not match.".to_string()));
    }

    let identity = state
        .auth
        .sign_up(&request.email, &request.password)
        .await?;
    state.auth.send_verification(&identity.email).await?;

    Ok(Json(RegisterResponse {
        message: format!(
            "Account created. Check {} for the verification link.",
            identity.email
        ),
        email: identity.email,
    }))
}

/// `GET /api/auth/me` — the current session's identity.
pub async fn me_handler(jar: CookieJar) -> Result<Json<Identity>, AppError> {
    Ok(Json(require_identity(&jar)?))
}

/// `POST /api/auth/logout` — end the session.
pub async fn logout_handler(jar: CookieJar) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").removal().build();
    jar.remove(cookie)
}
