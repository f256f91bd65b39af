use crate::domain::Subscriber;
use crate::repository::{
    BackendKind, DocumentCollection, DocumentFilter, RepositoryError, SubscriberRepository,
};
use std::sync::Arc;

/// The primary document-store backend. Every operation is keyed directly by email.
pub struct MongoSubscriberRepository {
    collection: Arc<dyn DocumentCollection>,
}

impl MongoSubscriberRepository {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait::async_trait]
impl SubscriberRepository for MongoSubscriberRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::Mongo
    }

    #[tracing::instrument(name = "Listing subscribers from MongoDB", skip(self))]
    async fn list(&self) -> Vec<Subscriber> {
        self.collection.find_all().await.unwrap_or_else(|e| {
            tracing::error!(error.cause_chain = ?e, "Failed to list subscribers");
            Vec::new()
        })
    }

    #[tracing::instrument(
        name = "Fetching subscriber by id from MongoDB",
        skip(self, id),
        fields(subscriber_id = %id)
    )]
    async fn find_by_id(&self, id: &str) -> Result<Option<Subscriber>, RepositoryError> {
        self.collection
            .find_one(DocumentFilter::Id(id.to_string()))
            .await
    }

    #[tracing::instrument(
        name = "Fetching subscriber by email from MongoDB",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, RepositoryError> {
        self.collection
            .find_one(DocumentFilter::Email(email.to_string()))
            .await
    }

    #[tracing::instrument(
        name = "Checking whether a subscriber exists in MongoDB",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn exists(&self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    #[tracing::instrument(
        name = "Inserting subscriber into MongoDB",
        skip(self, subscriber),
        fields(subscriber_email = %subscriber.email)
    )]
    async fn add(&self, subscriber: Subscriber) -> bool {
        match self.collection.insert_one(&subscriber).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "Failed to insert subscriber");
                false
            }
        }
    }

    #[tracing::instrument(
        name = "Updating subscriber in MongoDB",
        skip(self, subscriber),
        fields(subscriber_email = %subscriber.email)
    )]
    async fn update(&self, subscriber: &Subscriber) -> Result<bool, RepositoryError> {
        let modified = self
            .collection
            .replace_one(DocumentFilter::Email(subscriber.email.clone()), subscriber)
            .await?;
        Ok(modified > 0)
    }

    #[tracing::instrument(
        name = "Deleting subscriber from MongoDB",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn delete(&self, email: &str) -> Result<bool, RepositoryError> {
        let deleted = self
            .collection
            .delete_one(DocumentFilter::Email(email.to_string()))
            .await?;
        Ok(deleted > 0)
    }
}
