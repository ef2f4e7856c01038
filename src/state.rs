use std::sync::Arc;

use crate::auth::provider::AuthProvider;
use crate::db::feedback_repository::FeedbackRepository;
use crate::db::repository::PageRepository;
use crate::db::shell_repository::ShellRepository;
use crate::mail::MailBridge;
use crate::upload::client::UploadClient;

/// Shared application state: every external collaborator behind its
/// trait, so handlers stay testable without live services.
#[derive(Clone)]
pub struct AppState {
    pub pages: Arc<dyn PageRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub shells: Arc<dyn ShellRepository>,
    pub auth: Arc<dyn AuthProvider>,
    pub uploader: Arc<dyn UploadClient>,
    /// Absent when no mail bridge is configured; feedback still works,
    /// it just is not announced.
    pub mailer: Option<Arc<dyn MailBridge>>,
}
