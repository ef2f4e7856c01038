use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::{Page, PageBody};
use crate::error::AppError;

/// Fields the edit flow may change on an existing page.
///
/// Serialized as the `$set` document of the update, so wire names match
/// the stored document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePatch {
    pub title: String,
    #[serde(flatten)]
    pub body: PageBody,
    pub last_edited_by: String,
    pub last_edited_at: DateTime<Utc>,
}

/// Repository trait for page operations.
///
/// This trait allows mocking the store in tests.
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Direct lookup by document id (new id scheme).
    async fn find_by_id(&self, doc_id: &str) -> Result<Option<Page>, AppError>;

    /// Query by the legacy `fullPath` field (old id scheme). Returns the
    /// first match.
    async fn find_by_full_path(&self, full_path: &str) -> Result<Option<Page>, AppError>;

    /// Every page the store lets this process see.
    async fn list_all(&self) -> Result<Vec<Page>, AppError>;

    /// Insert a new page. Fails with a conflict when the id is taken —
    /// the store's unique id index is the atomic backstop behind the
    /// explicit duplicate check.
    async fn create(&self, page: Page) -> Result<(), AppError>;

    /// Apply an edit to an existing page in place.
    async fn update_content(&self, doc_id: &str, patch: PagePatch) -> Result<(), AppError>;

    /// Remove a page by id. Missing ids fail with `NotFound`.
    async fn delete(&self, doc_id: &str) -> Result<(), AppError>;
}

/// MongoDB implementation of the [`PageRepository`].
pub struct MongoPageRepository {
    collection: mongodb::Collection<Page>,
}

impl MongoPageRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("pages"),
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

#[async_trait]
impl PageRepository for MongoPageRepository {
    async fn find_by_id(&self, doc_id: &str) -> Result<Option<Page>, AppError> {
        use bson::doc;

        self.collection
            .find_one(doc! { "_id": doc_id })
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn find_by_full_path(&self, full_path: &str) -> Result<Option<Page>, AppError> {
        use bson::doc;

        self.collection
            .find_one(doc! { "fullPath": full_path })
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<Page>, AppError> {
        use futures::TryStreamExt;
        use bson::doc;

        let mut cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        let mut pages = Vec::new();
        while let Some(page) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?
        {
            pages.push(page);
        }

        Ok(pages)
    }

    async fn create(&self, page: Page) -> Result<(), AppError> {
        let full_path = page.full_path.clone();
        match self.collection.insert_one(&page).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(format!(
                "Page already exists at /{full_path}"
            ))),
            Err(e) => Err(AppError::Store(e.to_string())),
        }
    }

    async fn update_content(&self, doc_id: &str, patch: PagePatch) -> Result<(), AppError> {
        use bson::doc;

        let set = bson::to_document(&patch)
            .map_err(|e| AppError::Internal(format!("Failed to serialize page patch: {e}")))?;

        let result = self
            .collection
            .update_one(doc! { "_id": doc_id }, doc! { "$set": set })
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("No page with id '{doc_id}'")));
        }

        Ok(())
    }

    async fn delete(&self, doc_id: &str) -> Result<(), AppError> {
        use bson::doc;

        let result = self
            .collection
            .delete_one(doc! { "_id": doc_id })
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("No page with id '{doc_id}'")));
        }

        Ok(())
    }
}
