use async_trait::async_trait;

use crate::db::models::AdminShell;
use crate::error::AppError;

/// Repository for the `admin` collection of named HTML fragments.
///
/// The admin dashboard keeps its UI shells in the store so they can be
/// changed without a redeploy; they are served verbatim to signed-in
/// administrators.
#[async_trait]
pub trait ShellRepository: Send + Sync {
    async fn find_html(&self, name: &str) -> Result<Option<String>, AppError>;
}

/// MongoDB implementation of the [`ShellRepository`].
pub struct MongoShellRepository {
    collection: mongodb::Collection<AdminShell>,
}

impl MongoShellRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("admin"),
        }
    }
}

#[async_trait]
impl ShellRepository for MongoShellRepository {
    async fn find_html(&self, name: &str) -> Result<Option<String>, AppError> {
        use bson::doc;

        Ok(self
            .collection
            .find_one(doc! { "_id": name })
            .await
            .map_err(|e| AppError::Store(e.to_string()))?
            .map(|shell| shell.html))
    }
}
