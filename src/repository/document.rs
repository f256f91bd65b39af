use crate::domain::Subscriber;
use crate::repository::RepositoryError;
use crate::selector::ConnectionDescriptor;
use std::sync::Arc;

/// How a single document is addressed in the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFilter {
    Email(String),
    Id(String),
}

/// The slice of a remote document collection the repositories rely on.
///
/// Documents carry `id` (store-assigned), `name` and `email`. Implementations are expected to
/// enforce email uniqueness natively, typically through a unique index: `insert_one` must fail
/// rather than store a second document with the same email.
#[async_trait::async_trait]
pub trait DocumentCollection: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Subscriber>, RepositoryError>;

    async fn find_one(&self, filter: DocumentFilter) -> Result<Option<Subscriber>, RepositoryError>;

    /// Returns the identifier the store assigned to the new document.
    async fn insert_one(&self, subscriber: &Subscriber) -> Result<String, RepositoryError>;

    /// Returns how many documents were actually modified.
    async fn replace_one(
        &self,
        filter: DocumentFilter,
        subscriber: &Subscriber,
    ) -> Result<u64, RepositoryError>;

    /// Returns how many documents were removed.
    async fn delete_one(&self, filter: DocumentFilter) -> Result<u64, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Makes the store reject a second document with the same email. Best effort: failures are
    /// logged, not returned.
    async fn ensure_unique_email_index(&self) {}
}

/// Opens the collection described by a `ConnectionDescriptor`.
#[async_trait::async_trait]
pub trait DocumentStoreConnector: Send + Sync {
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Arc<dyn DocumentCollection>, RepositoryError>;
}
