//! In-process stand-ins for the document store, shared by the unit tests.
use crate::domain::Subscriber;
use crate::repository::{
    DocumentCollection, DocumentFilter, DocumentStoreConnector, RepositoryError,
};
use crate::selector::ConnectionDescriptor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Default)]
pub(crate) struct FakeCollection {
    documents: Mutex<Vec<Subscriber>>,
    deletes: Mutex<Vec<DocumentFilter>>,
    next_id: AtomicU64,
    indexed: AtomicBool,
    unreachable: bool,
    hangs: bool,
}

impl FakeCollection {
    /// Every operation fails as if the server could not be reached.
    pub(crate) fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// `count` never completes.
    pub(crate) fn hanging() -> Self {
        Self {
            hangs: true,
            ..Self::default()
        }
    }

    /// Starts with `documents` stored exactly as given, ids included or not.
    pub(crate) fn with_documents(documents: Vec<Subscriber>) -> Self {
        Self {
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    pub(crate) fn is_indexed(&self) -> bool {
        self.indexed.load(Ordering::SeqCst)
    }

    pub(crate) fn deletes(&self) -> Vec<DocumentFilter> {
        self.deletes.lock().unwrap().clone()
    }

    fn reachable(&self) -> Result<(), RepositoryError> {
        if self.unreachable {
            Err(anyhow::anyhow!("Server selection timed out").into())
        } else {
            Ok(())
        }
    }
}

fn matches(subscriber: &Subscriber, filter: &DocumentFilter) -> bool {
    match filter {
        DocumentFilter::Email(email) => &subscriber.email == email,
        DocumentFilter::Id(id) => subscriber.id.as_ref() == Some(id),
    }
}

#[async_trait::async_trait]
impl DocumentCollection for FakeCollection {
    async fn find_all(&self) -> Result<Vec<Subscriber>, RepositoryError> {
        self.reachable()?;
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn find_one(&self, filter: DocumentFilter) -> Result<Option<Subscriber>, RepositoryError> {
        self.reachable()?;
        let documents = self.documents.lock().unwrap();
        Ok(documents.iter().find(|s| matches(s, &filter)).cloned())
    }

    async fn insert_one(&self, subscriber: &Subscriber) -> Result<String, RepositoryError> {
        self.reachable()?;
        let mut documents = self.documents.lock().unwrap();
        if documents.iter().any(|s| s.email == subscriber.email) {
            return Err(anyhow::anyhow!("E11000 duplicate key error").into());
        }
        let id = format!("{:024x}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        documents.push(Subscriber {
            id: Some(id.clone()),
            ..subscriber.clone()
        });
        Ok(id)
    }

    async fn replace_one(
        &self,
        filter: DocumentFilter,
        subscriber: &Subscriber,
    ) -> Result<u64, RepositoryError> {
        self.reachable()?;
        let mut documents = self.documents.lock().unwrap();
        match documents.iter_mut().find(|s| matches(s, &filter)) {
            Some(existing) if existing.name != subscriber.name => {
                existing.name = subscriber.name.clone();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_one(&self, filter: DocumentFilter) -> Result<u64, RepositoryError> {
        self.reachable()?;
        self.deletes.lock().unwrap().push(filter.clone());
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|s| !matches(s, &filter));
        Ok((before - documents.len()) as u64)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        if self.hangs {
            std::future::pending::<()>().await;
        }
        self.reachable()?;
        Ok(self.documents.lock().unwrap().len() as u64)
    }

    async fn ensure_unique_email_index(&self) {
        if self.reachable().is_ok() {
            self.indexed.store(true, Ordering::SeqCst);
        }
    }
}

/// What the fake connector hands back on `connect`.
pub(crate) enum FakeConnector {
    Healthy,
    Refusing,
    Unreachable,
    Hanging,
    /// Hands out the given collection, so the test can inspect it afterwards.
    Serving(Arc<FakeCollection>),
}

#[async_trait::async_trait]
impl DocumentStoreConnector for FakeConnector {
    async fn connect(
        &self,
        _descriptor: &ConnectionDescriptor,
    ) -> Result<Arc<dyn DocumentCollection>, RepositoryError> {
        match self {
            FakeConnector::Healthy => Ok(Arc::new(FakeCollection::default())),
            FakeConnector::Refusing => Err(anyhow::anyhow!("Invalid connection string").into()),
            FakeConnector::Unreachable => Ok(Arc::new(FakeCollection::unreachable())),
            FakeConnector::Hanging => Ok(Arc::new(FakeCollection::hanging())),
            FakeConnector::Serving(collection) => Ok(collection.clone()),
        }
    }
}

/// Captures the `subscriber_email` field of every span opened while installed.
#[derive(Clone, Default)]
pub(crate) struct RecordedSpans(Arc<Mutex<Vec<(&'static str, String)>>>);

impl RecordedSpans {
    /// Routes this thread's spans through the recorder until the guard is dropped.
    pub(crate) fn install(&self) -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub(crate) fn subscriber_emails(&self) -> Vec<(&'static str, String)> {
        self.0.lock().unwrap().clone()
    }
}

struct SubscriberEmailField(Option<String>);

impl Visit for SubscriberEmailField {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "subscriber_email" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for RecordedSpans {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut field = SubscriberEmailField(None);
        attrs.record(&mut field);
        if let Some(email) = field.0 {
            self.0.lock().unwrap().push((attrs.metadata().name(), email));
        }
    }
}
