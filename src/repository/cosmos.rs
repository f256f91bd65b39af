use crate::domain::Subscriber;
use crate::repository::{
    BackendKind, DocumentCollection, DocumentFilter, RepositoryError, SubscriberRepository,
};
use std::sync::Arc;

/// The alternate document-store backend.
///
/// The collection is partitioned on the document identifier, so a delete always resolves the
/// email to its identifier first and then removes the document by identifier. Lookups and
/// updates stay keyed by email.
pub struct CosmosSubscriberRepository {
    collection: Arc<dyn DocumentCollection>,
}

impl CosmosSubscriberRepository {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }
}

#[async_trait::async_trait]
impl SubscriberRepository for CosmosSubscriberRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::Cosmos
    }

    #[tracing::instrument(name = "Listing subscribers from Cosmos DB", skip(self))]
    async fn list(&self) -> Vec<Subscriber> {
        self.collection.find_all().await.unwrap_or_else(|e| {
            tracing::error!(error.cause_chain = ?e, "Failed to list subscribers");
            Vec::new()
        })
    }

    #[tracing::instrument(
        name = "Fetching subscriber by id from Cosmos DB",
        skip(self, id),
        fields(subscriber_id = %id)
    )]
    async fn find_by_id(&self, id: &str) -> Result<Option<Subscriber>, RepositoryError> {
        self.collection
            .find_one(DocumentFilter::Id(id.to_string()))
            .await
    }

    #[tracing::instrument(
        name = "Fetching subscriber by email from Cosmos DB",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, RepositoryError> {
        self.collection
            .find_one(DocumentFilter::Email(email.to_string()))
            .await
    }

    #[tracing::instrument(
        name = "Checking whether a subscriber exists in Cosmos DB",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn exists(&self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    #[tracing::instrument(
        name = "Inserting subscriber into Cosmos DB",
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
        name = "Updating subscriber in Cosmos DB",
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
        name = "Deleting subscriber from Cosmos DB",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn delete(&self, email: &str) -> Result<bool, RepositoryError> {
        let Some(subscriber) = self.find_by_email(email).await? else {
            return Ok(false);
        };
        let id = subscriber
            .id
            .ok_or_else(|| RepositoryError::MissingIdentifier(email.to_string()))?;
        let deleted = self.collection.delete_one(DocumentFilter::Id(id)).await?;
        Ok(deleted > 0)
    }
}
