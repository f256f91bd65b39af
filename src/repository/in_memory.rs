use crate::domain::Subscriber;
use crate::repository::{BackendKind, RepositoryError, SubscriberRepository};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Subscribers kept in insertion order inside the process. Nothing survives a restart.
///
/// A single lock guards the whole list, so the existence check inside `add` and the push that
/// follows it happen atomically: this is what keeps emails unique under concurrent signups.
#[derive(Debug, Default)]
pub struct InMemorySubscriberRepository {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::InMemory
    }

    #[tracing::instrument(name = "Listing subscribers in memory", skip(self))]
    async fn list(&self) -> Vec<Subscriber> {
        self.subscribers.lock().await.clone()
    }

    #[tracing::instrument(
        name = "Fetching subscriber by id in memory",
        skip(self, id),
        fields(subscriber_id = %id)
    )]
    async fn find_by_id(&self, id: &str) -> Result<Option<Subscriber>, RepositoryError> {
        let subscribers = self.subscribers.lock().await;
        Ok(subscribers
            .iter()
            .find(|s| s.id.as_deref() == Some(id))
            .cloned())
    }

    #[tracing::instrument(
        name = "Fetching subscriber by email in memory",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, RepositoryError> {
        let subscribers = self.subscribers.lock().await;
        Ok(subscribers.iter().find(|s| s.email == email).cloned())
    }

    #[tracing::instrument(
        name = "Checking whether a subscriber exists in memory",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn exists(&self, email: &str) -> Result<bool, RepositoryError> {
        let subscribers = self.subscribers.lock().await;
        Ok(subscribers.iter().any(|s| s.email == email))
    }

    #[tracing::instrument(
        name = "Storing subscriber in memory",
        skip(self, subscriber),
        fields(subscriber_email = %subscriber.email)
    )]
    async fn add(&self, mut subscriber: Subscriber) -> bool {
        let mut subscribers = self.subscribers.lock().await;
        if subscribers.iter().any(|s| s.email == subscriber.email) {
            return false;
        }
        if subscriber.id.is_none() {
            subscriber.id = Some(Uuid::new_v4().to_string());
        }
        subscribers.push(subscriber);
        true
    }

    #[tracing::instrument(
        name = "Updating subscriber in memory",
        skip(self, subscriber),
        fields(subscriber_email = %subscriber.email)
    )]
    async fn update(&self, subscriber: &Subscriber) -> Result<bool, RepositoryError> {
        let mut subscribers = self.subscribers.lock().await;
        match subscribers.iter_mut().find(|s| s.email == subscriber.email) {
            Some(existing) => {
                existing.name = subscriber.name.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[tracing::instrument(
        name = "Deleting subscriber from memory",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn delete(&self, email: &str) -> Result<bool, RepositoryError> {
        let mut subscribers = self.subscribers.lock().await;
        match subscribers.iter().position(|s| s.email == email) {
            Some(index) => {
                subscribers.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
