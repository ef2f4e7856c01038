use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use waypost::auth::models::{Identity, SignInProvider};
use waypost::auth::provider::AuthProvider;
use waypost::db::feedback_repository::{FeedbackRepository, SortOrder};
use waypost::db::models::{Feedback, FileEntry, Page, PageBody};
use waypost::db::repository::{PagePatch, PageRepository};
use waypost::db::shell_repository::ShellRepository;
use waypost::error::AppError;
use waypost::mail::{FeedbackNote, MailBridge};
use waypost::state::AppState;
use waypost::upload::client::UploadClient;

/// In-memory page repository mirroring the store semantics the handlers
/// rely on: unique ids, `fullPath` equality queries.
#[derive(Default)]
pub struct InMemoryPages {
    pub items: Mutex<Vec<Page>>,
}

#[async_trait]
impl PageRepository for InMemoryPages {
    async fn find_by_id(&self, doc_id: &str) -> Result<Option<Page>, AppError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == doc_id)
            .cloned())
    }

    async fn find_by_full_path(&self, full_path: &str) -> Result<Option<Page>, AppError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.full_path == full_path)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Page>, AppError> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn create(&self, page: Page) -> Result<(), AppError> {
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|p| p.id == page.id) {
            return Err(AppError::Conflict(format!(
                "Page already exists at /{}",
                page.full_path
            )));
        }
        items.push(page);
        Ok(())
    }

    async fn update_content(&self, doc_id: &str, patch: PagePatch) -> Result<(), AppError> {
        let mut items = self.items.lock().unwrap();
        let page = items
            .iter_mut()
            .find(|p| p.id == doc_id)
            .ok_or_else(|| AppError::NotFound(format!("No page with id '{doc_id}'")))?;
        page.title = patch.title;
        page.body = patch.body;
        page.last_edited_by = Some(patch.last_edited_by);
        page.last_edited_at = Some(patch.last_edited_at);
        Ok(())
    }

    async fn delete(&self, doc_id: &str) -> Result<(), AppError> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|p| p.id != doc_id);
        if items.len() == before {
            return Err(AppError::NotFound(format!("No page with id '{doc_id}'")));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryFeedback {
    pub items: Mutex<Vec<Feedback>>,
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedback {
    async fn create(&self, feedback: Feedback) -> Result<(), AppError> {
        self.items.lock().unwrap().push(feedback);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Feedback>, AppError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<Feedback>, AppError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.content_hash == hash)
            .cloned())
    }

    async fn list(&self, order: SortOrder) -> Result<Vec<Feedback>, AppError> {
        let mut items = self.items.lock().unwrap().clone();
        items.sort_by_key(|f| f.submitted_at);
        if order == SortOrder::Desc {
            items.reverse();
        }
        Ok(items)
    }

    async fn set_resolved(&self, id: &str, resolved: bool) -> Result<(), AppError> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::NotFound(format!("No feedback with id '{id}'")))?;
        item.resolved = resolved;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|f| f.id != id);
        if items.len() == before {
            return Err(AppError::NotFound(format!("No feedback with id '{id}'")));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryShells {
    pub items: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ShellRepository for InMemoryShells {
    async fn find_html(&self, name: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|(shell, _)| shell == name)
            .map(|(_, html)| html.clone()))
    }
}

pub struct StaticUser {
    pub email: &'static str,
    pub password: &'static str,
    pub verified: bool,
    pub display_name: Option<&'static str>,
}

/// Static user table standing in for the hosted auth provider.
pub struct StaticAuthProvider {
    users: Mutex<Vec<StaticUser>>,
    pub verifications_sent: Mutex<Vec<String>>,
}

impl StaticAuthProvider {
    pub fn with_admin() -> Self {
        Self {
            users: Mutex::new(vec![
                StaticUser {
                    email: "admin@example.com",
                    password: "hunter2",
                    verified: true,
                    display_name: Some("Site Admin"),
                },
                StaticUser {
                    email: "pending@example.com",
                    password: "hunter2",
                    verified: false,
                    display_name: None,
                },
            ]),
            verifications_sent: Mutex::new(vec![]),
        }
    }

    fn identity(user: &StaticUser) -> Identity {
        Identity {
            email: user.email.to_string(),
            display_name: user.display_name.map(str::to_string),
            email_verified: user.verified,
            provider_id: SignInProvider::Password,
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email && u.password == password)
            .map(Self::identity)
            .ok_or_else(|| AppError::Auth("Invalid email or password".to_string()))
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<Identity, AppError> {
        let users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::Auth("Email already in use".to_string()));
        }
        Ok(Identity {
            email: email.to_string(),
            display_name: None,
            email_verified: false,
            provider_id: SignInProvider::Password,
        })
    }

    async fn send_verification(&self, email: &str) -> Result<(), AppError> {
        self.verifications_sent
            .lock()
            .unwrap()
            .push(email.to_string());
        Ok(())
    }

    async fn reauthenticate(&self, email: &str, password: &str) -> Result<(), AppError> {
        self.sign_in(email, password).await.map(|_| ())
    }
}

/// Upload client that fabricates CDN entries without any network.
#[derive(Default)]
pub struct StubUploader {
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl UploadClient for StubUploader {
    async fn upload(
        &self,
        file_name: &str,
        _content_type: &str,
        content: Vec<u8>,
    ) -> Result<FileEntry, AppError> {
        self.uploads.lock().unwrap().push(file_name.to_string());
        let format = file_name.rsplit('.').next().unwrap_or("bin").to_string();
        Ok(FileEntry {
            name: file_name.to_string(),
            url: format!("https://cdn.test/{file_name}"),
            bytes: content.len() as u64,
            format,
        })
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub notes: Mutex<Vec<FeedbackNote>>,
}

impl MailBridge for RecordingMailer {
    fn notify(&self, note: FeedbackNote) {
        self.notes.lock().unwrap().push(note);
    }
}

/// Everything wired to in-memory collaborators, plus the concrete
/// handles the assertions need.
pub struct TestEnv {
    pub pages: Arc<InMemoryPages>,
    pub feedback: Arc<InMemoryFeedback>,
    pub shells: Arc<InMemoryShells>,
    pub auth: Arc<StaticAuthProvider>,
    pub uploader: Arc<StubUploader>,
    pub mailer: Arc<RecordingMailer>,
    pub router: axum::Router,
}

impl TestEnv {
    pub fn start() -> Self {
        let pages = Arc::new(InMemoryPages::default());
        let feedback = Arc::new(InMemoryFeedback::default());
        let shells = Arc::new(InMemoryShells::default());
        let auth = Arc::new(StaticAuthProvider::with_admin());
        let uploader = Arc::new(StubUploader::default());
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState {
            pages: pages.clone(),
            feedback: feedback.clone(),
            shells: shells.clone(),
            auth: auth.clone(),
            uploader: uploader.clone(),
            mailer: Some(mailer.clone()),
        };

        let router = waypost::app::router(state);

        Self {
            pages,
            feedback,
            shells,
            auth,
            uploader,
            mailer,
            router,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .expect_success_by_default()
            .build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Helper: sign in as the seeded admin so the session cookie is saved.
    pub async fn sign_in(&self, server: &axum_test::TestServer) {
        server
            .post("/api/auth/login")
            .json(&serde_json::json!({
                "email": "admin@example.com",
                "password": "hunter2"
            }))
            .await;
    }

    /// Helper: create a markdown page through the API.
    pub async fn create_page(
        &self,
        server: &axum_test::TestServer,
        path: &str,
        title: &str,
        content: &str,
    ) -> axum_test::TestResponse {
        server
            .post("/api/v1/pages")
            .json(&serde_json::json!({
                "title": title,
                "path": path,
                "type": "markdown",
                "content": content
            }))
            .await
    }

    /// Helper: insert a page the way the historical client stored it —
    /// auto-generated id, found only through its `fullPath` field.
    pub fn seed_legacy_page(&self, full_path: &str, title: &str, content: &str) -> String {
        let id = format!("legacy-{}", uuid::Uuid::new_v4().simple());
        let page = Page {
            id: id.clone(),
            title: title.to_string(),
            name: full_path.rsplit('/').next().unwrap().to_string(),
            path: "/".to_string(),
            full_path: full_path.to_string(),
            body: PageBody::Markdown(content.to_string()),
            access_level: None,
            created_at: None,
            created_by: Some("founder@example.com".to_string()),
            last_edited_at: None,
            last_edited_by: None,
        };
        self.pages.items.lock().unwrap().push(page);
        id
    }
}
