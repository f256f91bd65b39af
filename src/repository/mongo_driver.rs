use crate::domain::Subscriber;
use crate::repository::{
    DocumentCollection, DocumentFilter, DocumentStoreConnector, RepositoryError,
};
use crate::selector::ConnectionDescriptor;
use anyhow::Context;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;

/// On-disk shape of a subscriber.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct SubscriberDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    email: String,
}

impl From<SubscriberDocument> for Subscriber {
    fn from(document: SubscriberDocument) -> Self {
        Subscriber {
            id: document.id.map(|id| id.to_hex()),
            name: document.name,
            email: document.email,
        }
    }
}

impl SubscriberDocument {
    /// The identifier is left out: inserts get one from the server, and replacements must not
    /// touch it.
    fn without_id(subscriber: &Subscriber) -> Self {
        Self {
            id: None,
            name: subscriber.name.clone(),
            email: subscriber.email.clone(),
        }
    }
}

fn parse_object_id(id: &str) -> Result<ObjectId, RepositoryError> {
    ObjectId::parse_str(id).map_err(|_| RepositoryError::InvalidIdentifier(id.to_string()))
}

fn to_query(filter: DocumentFilter) -> Result<Document, RepositoryError> {
    Ok(match filter {
        DocumentFilter::Email(email) => doc! { "email": email },
        DocumentFilter::Id(id) => doc! { "_id": parse_object_id(&id)? },
    })
}

/// A subscriber collection reached through the official MongoDB driver. Works against both
/// MongoDB proper and Cosmos DB's MongoDB API.
pub struct MongoCollection {
    collection: Collection<SubscriberDocument>,
}

#[async_trait::async_trait]
impl DocumentCollection for MongoCollection {
    async fn find_all(&self) -> Result<Vec<Subscriber>, RepositoryError> {
        let mut cursor = self
            .collection
            .find(None, None)
            .await
            .context("Failed to query the subscriber collection.")?;
        let mut subscribers = Vec::new();
        while cursor
            .advance()
            .await
            .context("Failed to advance the subscriber cursor.")?
        {
            let document = cursor
                .deserialize_current()
                .context("Failed to deserialize a subscriber document.")?;
            subscribers.push(document.into());
        }
        Ok(subscribers)
    }

    async fn find_one(&self, filter: DocumentFilter) -> Result<Option<Subscriber>, RepositoryError> {
        let document = self
            .collection
            .find_one(to_query(filter)?, None)
            .await
            .context("Failed to look up a subscriber.")?;
        Ok(document.map(Into::into))
    }

    async fn insert_one(&self, subscriber: &Subscriber) -> Result<String, RepositoryError> {
        let result = self
            .collection
            .insert_one(SubscriberDocument::without_id(subscriber), None)
            .await
            .context("Failed to insert a subscriber.")?;
        Ok(result
            .inserted_id
            .as_object_id()
            .map(|id| id.to_hex())
            .unwrap_or_else(|| result.inserted_id.to_string()))
    }

    async fn replace_one(
        &self,
        filter: DocumentFilter,
        subscriber: &Subscriber,
    ) -> Result<u64, RepositoryError> {
        let result = self
            .collection
            .replace_one(
                to_query(filter)?,
                SubscriberDocument::without_id(subscriber),
                None,
            )
            .await
            .context("Failed to replace a subscriber.")?;
        Ok(result.modified_count)
    }

    async fn delete_one(&self, filter: DocumentFilter) -> Result<u64, RepositoryError> {
        let result = self
            .collection
            .delete_one(to_query(filter)?, None)
            .await
            .context("Failed to delete a subscriber.")?;
        Ok(result.deleted_count)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count = self
            .collection
            .count_documents(None, None)
            .await
            .context("Failed to count subscribers.")?;
        Ok(count)
    }

    /// Best effort: the repositories rely on the store rejecting duplicate emails, but an
    /// account without index privileges must still be able to serve traffic.
    #[tracing::instrument(name = "Ensuring a unique index on email", skip(self))]
    async fn ensure_unique_email_index(&self) {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        if let Err(e) = self.collection.create_index(index, None).await {
            tracing::warn!(
                error.cause_chain = ?e,
                "Failed to create a unique index on `email`. Duplicate emails are only guarded by the existence check"
            );
        }
    }
}

/// Opens subscriber collections with the MongoDB driver.
pub struct MongoConnector {
    server_selection_timeout: Duration,
}

impl MongoConnector {
    pub fn new(server_selection_timeout: Duration) -> Self {
        Self {
            server_selection_timeout,
        }
    }
}

#[async_trait::async_trait]
impl DocumentStoreConnector for MongoConnector {
    #[tracing::instrument(
        name = "Connecting to the document store",
        skip(self, descriptor),
        fields(
            database_name = %descriptor.database_name,
            collection_name = %descriptor.collection_name
        )
    )]
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Arc<dyn DocumentCollection>, RepositoryError> {
        let mut options = ClientOptions::parse(descriptor.connection_string.expose_secret())
            .await
            .context("Failed to parse the document store connection string.")?;
        options.server_selection_timeout = Some(self.server_selection_timeout);
        let client =
            Client::with_options(options).context("Failed to build the document store client.")?;
        let collection = MongoCollection {
            collection: client
                .database(&descriptor.database_name)
                .collection(&descriptor.collection_name),
        };
        Ok(Arc::new(collection))
    }
}
