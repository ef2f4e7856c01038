use async_trait::async_trait;

use crate::db::models::Feedback;
use crate::error::AppError;

/// Sort direction for the feedback inbox, newest-first by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse the `sort` query parameter; anything unrecognized falls back
    /// to descending.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Repository trait for feedback operations.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn create(&self, feedback: Feedback) -> Result<(), AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Feedback>, AppError>;

    /// Query by the duplicate-detection hash.
    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<Feedback>, AppError>;

    /// All feedback, sorted by submission time.
    async fn list(&self, order: SortOrder) -> Result<Vec<Feedback>, AppError>;

    async fn set_resolved(&self, id: &str, resolved: bool) -> Result<(), AppError>;

    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// MongoDB implementation of the [`FeedbackRepository`].
pub struct MongoFeedbackRepository {
    collection: mongodb::Collection<Feedback>,
}

impl MongoFeedbackRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("feedback"),
        }
    }
}

#[async_trait]
impl FeedbackRepository for MongoFeedbackRepository {
    async fn create(&self, feedback: Feedback) -> Result<(), AppError> {
        self.collection
            .insert_one(&feedback)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Feedback>, AppError> {
        use bson::doc;

        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<Feedback>, AppError> {
        use bson::doc;

        self.collection
            .find_one(doc! { "contentHash": hash })
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    async fn list(&self, order: SortOrder) -> Result<Vec<Feedback>, AppError> {
        use futures::TryStreamExt;
        use bson::doc;
        use mongodb::options::FindOptions;

        let direction = match order {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        };
        let options = FindOptions::builder()
            .sort(doc! { "submittedAt": direction })
            .build();

        let mut cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        let mut items = Vec::new();
        while let Some(item) = cursor
            .try_next()
            .await
            .map_err(|e| AppError::Store(e.to_string()))?
        {
            items.push(item);
        }

        Ok(items)
    }

    async fn set_resolved(&self, id: &str, resolved: bool) -> Result<(), AppError> {
        use bson::doc;

        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "resolved": resolved } })
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("No feedback with id '{id}'")));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        use bson::doc;

        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("No feedback with id '{id}'")));
        }

        Ok(())
    }
}
