//! Subscriber storage behind a single capability contract.
//!
//! Three backends implement [`SubscriberRepository`]: an in-process list, and two wrappers over a
//! remote document collection that differ in how they key deletes. Which one a process uses is
//! decided once at startup by [`crate::selector::select_repository`].
mod cosmos;
mod document;
mod in_memory;
mod mongo;
mod mongo_driver;
#[cfg(test)]
pub(crate) mod testing;

pub use cosmos::CosmosSubscriberRepository;
pub use document::{DocumentCollection, DocumentFilter, DocumentStoreConnector};
pub use in_memory::InMemorySubscriberRepository;
pub use mongo::MongoSubscriberRepository;
pub use mongo_driver::MongoConnector;

use crate::domain::Subscriber;
use crate::utils::error_chain_fmt;

/// All operations are keyed by the exact email string. The `id` carried on a `Subscriber` is
/// opaque to callers and only meaningful to the backend that assigned it.
///
/// Expected outcomes are values, not errors: a miss is `None`/`false`, and `add` folds a
/// uniqueness violation into `false`. `Err` is reserved for infrastructure faults.
#[async_trait::async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Which backend this is, for diagnostics.
    fn kind(&self) -> BackendKind;

    /// Every stored subscriber. An unreachable store yields an empty list.
    async fn list(&self) -> Vec<Subscriber>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Subscriber>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, RepositoryError>;

    async fn exists(&self, email: &str) -> Result<bool, RepositoryError>;

    /// `true` only if the subscriber was inserted. A duplicate email and a failed insert both
    /// return `false`; check `exists` beforehand to tell them apart.
    async fn add(&self, subscriber: Subscriber) -> bool;

    /// `true` only if a record with the same email existed and was modified.
    async fn update(&self, subscriber: &Subscriber) -> Result<bool, RepositoryError>;

    /// `true` only if a record with this email existed and was removed.
    async fn delete(&self, email: &str) -> Result<bool, RepositoryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    InMemory,
    Mongo,
    Cosmos,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::InMemory => "inmemory",
            BackendKind::Mongo => "mongo",
            BackendKind::Cosmos => "cosmos",
        }
    }

    /// Whether this backend lives in a remote document store.
    pub fn is_remote(&self) -> bool {
        !matches!(self, BackendKind::InMemory)
    }
}

impl TryFrom<String> for BackendKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "inmemory" => Ok(Self::InMemory),
            "mongo" => Ok(Self::Mongo),
            "cosmos" => Ok(Self::Cosmos),
            other => Err(format!(
                "{other} is not a supported repository kind. Use either `inmemory`, `mongo` or `cosmos`."
            )),
        }
    }
}

#[derive(thiserror::Error)]
pub enum RepositoryError {
    #[error("`{0}` is not a valid document identifier.")]
    InvalidIdentifier(String),
    #[error("The stored subscriber {0} has no identifier.")]
    MissingIdentifier(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
