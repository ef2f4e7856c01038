use serde::Serialize;
use url::Url;

use crate::error::AppError;

/// Payload posted to the outbound mail bridge when feedback arrives.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackNote {
    pub title: String,
    pub name: String,
    pub message: String,
    pub page: String,
    pub contact: String,
}

/// Fire-and-forget notification channel for new feedback.
///
/// `notify` must never block or fail the submitting request; delivery
/// problems are logged and dropped.
pub trait MailBridge: Send + Sync {
    fn notify(&self, note: FeedbackNote);
}

/// HTTP implementation of [`MailBridge`] posting to the configured
/// endpoint on a detached task.
pub struct HttpMailBridge {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpMailBridge {
    pub fn new(http: reqwest::Client, endpoint: &str) -> Result<Self, AppError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::Internal(format!("Invalid mail bridge endpoint: {e}")))?;
        Ok(Self { http, endpoint })
    }
}

impl MailBridge for HttpMailBridge {
    fn notify(&self, note: FeedbackNote) {
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        tokio::spawn(async move {
            let result = http
                .post(endpoint)
                .json(&note)
                .send()
                .await
                .and_then(|response| response.error_for_status());
            if let Err(e) = result {
                tracing::warn!("Failed to deliver feedback notification: {e}");
            }
        });
    }
}
