use axum::http::HeaderMap;
use axum::Json;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::session::{identity_from_jar, require_identity};
use crate::db::feedback_repository::{FeedbackRepository, SortOrder};
use crate::db::models::Feedback;
use crate::error::AppError;
use crate::mail::{FeedbackNote, MailBridge};
use crate::state::AppState;

const MIN_MESSAGE_LEN: usize = 10;
const MAX_MESSAGE_LEN: usize = 5000;
const MAX_LINKS: usize = 3;
const PREVIEW_LEN: usize = 100;

/// A feedback form submission.
///
/// `website` is a honeypot: the visible form never fills it, bots
/// routinely do.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    pub title: String,
    pub page: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    pub message: String,
    #[serde(default)]
    pub related_page: Option<String>,
    #[serde(default)]
    pub website: String,
}

/// Anti-spam heuristics, applied before anything touches the store.
pub fn vet_submission(submission: &FeedbackSubmission) -> Result<(), AppError> {
    if !submission.website.is_empty() {
        return Err(AppError::Validation("Submission rejected.".to_string()));
    }
    if submission.title.trim().is_empty() {
        return Err(AppError::Validation("A title is required.".to_string()));
    }
    let message = submission.message.trim();
    if message.chars().count() < MIN_MESSAGE_LEN {
        return Err(AppError::Validation("Message is too short.".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::Validation("Message is too long.".to_string()));
    }
    let links = message.matches("http://").count() + message.matches("https://").count();
    if links > MAX_LINKS {
        return Err(AppError::Validation(
            "Message contains too many links.".to_string(),
        ));
    }
    Ok(())
}

/// Duplicate-detection hash over the message and the source address.
fn content_hash(message: &str, ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    hasher.update(ip.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub message: String,
    pub id: String,
}

/// Core submission logic — vet, store, then notify fire-and-forget.
pub async fn process_submission(
    repo: &dyn FeedbackRepository,
    mailer: Option<&dyn MailBridge>,
    submission: FeedbackSubmission,
    ip: String,
    user_agent: String,
    uid: Option<String>,
) -> Result<FeedbackResponse, AppError> {
    vet_submission(&submission)?;

    let hash = content_hash(&submission.message, &ip);
    if repo.find_by_content_hash(&hash).await?.is_some() {
        return Err(AppError::Conflict(
            "This feedback was already submitted.".to_string(),
        ));
    }

    let name = if submission.name.trim().is_empty() {
        "Anonymous".to_string()
    } else {
        submission.name.trim().to_string()
    };
    let contact = if submission.contact.trim().is_empty() {
        "Not provided".to_string()
    } else {
        submission.contact.trim().to_string()
    };

    let feedback = Feedback {
        id: Uuid::new_v4().to_string(),
        title: submission.title.trim().to_string(),
        page: submission.page.trim().to_string(),
        name,
        contact,
        message: submission.message.trim().to_string(),
        related_page: submission
            .related_page
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "General".to_string()),
        ip,
        user_agent,
        submitted_at: Utc::now(),
        uid,
        resolved: false,
        content_hash: hash,
    };

    let id = feedback.id.clone();
    let note = FeedbackNote {
        title: feedback.title.clone(),
        name: feedback.name.clone(),
        message: feedback.message.clone(),
        page: feedback.page.clone(),
        contact: feedback.contact.clone(),
    };

    repo.create(feedback).await?;

    // Fire-and-forget: the submitter never waits on mail delivery.
    if let Some(mailer) = mailer {
        mailer.notify(note);
    }

    Ok(FeedbackResponse {
        message: "Feedback submitted. Thank you!".to_string(),
        id,
    })
}

/// Best-effort client address: proxy header first, then nothing.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("Unknown")
        .to_string()
}

/// Axum handler for `POST /api/v1/feedback`.
pub async fn submit_feedback_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(submission): Json<FeedbackSubmission>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let uid = identity_from_jar(&jar).map(|identity| identity.email);
    let response = process_submission(
        state.feedback.as_ref(),
        state.mailer.as_deref(),
        submission,
        client_ip(&headers),
        user_agent(&headers),
        uid,
    )
    .await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct InboxParams {
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub hide_resolved: bool,
}

/// One inbox row: enough for the list view, message truncated to a
/// preview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub id: String,
    pub title: String,
    pub page: String,
    pub contact: String,
    pub ip: String,
    pub resolved: bool,
    pub preview: String,
}

fn preview(message: &str) -> String {
    let truncated: String = message.chars().take(PREVIEW_LEN).collect();
    if message.chars().count() > PREVIEW_LEN {
        format!("{truncated}...")
    } else {
        truncated
    }
}

/// Axum handler for `GET /api/v1/feedback` — the admin inbox.
pub async fn list_feedback_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    axum::extract::Query(params): axum::extract::Query<InboxParams>,
) -> Result<Json<Vec<FeedbackSummary>>, AppError> {
    require_identity(&jar)?;

    let order = SortOrder::from_param(params.sort.as_deref());
    let items = state.feedback.list(order).await?;

    let summaries = items
        .into_iter()
        .filter(|item| !(params.hide_resolved && item.resolved))
        .map(|item| FeedbackSummary {
            id: item.id,
            title: item.title,
            page: item.page,
            contact: item.contact,
            ip: item.ip,
            resolved: item.resolved,
            preview: preview(&item.message),
        })
        .collect();

    Ok(Json(summaries))
}

/// Feedback item selector: `?id=<feedbackId>`.
#[derive(Debug, Deserialize)]
pub struct ItemSelector {
    pub id: String,
}

/// Axum handler for `GET /api/v1/feedback/item?id=`.
pub async fn get_feedback_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    axum::extract::Query(selector): axum::extract::Query<ItemSelector>,
) -> Result<Json<Feedback>, AppError> {
    require_identity(&jar)?;
    let item = state
        .feedback
        .find_by_id(&selector.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No feedback with id '{}'", selector.id)))?;
    Ok(Json(item))
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub id: String,
    pub resolved: bool,
}

/// Axum handler for `POST /api/v1/feedback/item/resolve?id=` — toggles
/// the resolved flag.
pub async fn resolve_feedback_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    axum::extract::Query(selector): axum::extract::Query<ItemSelector>,
) -> Result<Json<ResolveResponse>, AppError> {
    require_identity(&jar)?;
    let item = state
        .feedback
        .find_by_id(&selector.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No feedback with id '{}'", selector.id)))?;

    let resolved = !item.resolved;
    state.feedback.set_resolved(&selector.id, resolved).await?;

    Ok(Json(ResolveResponse {
        id: selector.id,
        resolved,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteFeedbackResponse {
    pub message: String,
}

/// Axum handler for `DELETE /api/v1/feedback/item?id=`.
pub async fn delete_feedback_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
    jar: CookieJar,
    axum::extract::Query(selector): axum::extract::Query<ItemSelector>,
) -> Result<Json<DeleteFeedbackResponse>, AppError> {
    require_identity(&jar)?;
    state.feedback.delete(&selector.id).await?;
    Ok(Json(DeleteFeedbackResponse {
        message: "Feedback deleted".to_string(),
    }))
}
