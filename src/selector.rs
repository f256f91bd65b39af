//! One-time backend selection at process start.
//!
//! The selector never fails: whatever goes wrong while resolving configuration or reaching the
//! document store, the process ends up with a working in-memory repository and a log record
//! explaining why.
use crate::configuration::{MongoDbSettings, RepositorySettings};
use crate::repository::{
    BackendKind, CosmosSubscriberRepository, DocumentStoreConnector,
    InMemorySubscriberRepository, MongoSubscriberRepository, RepositoryError,
    SubscriberRepository,
};
use crate::utils::error_chain_fmt;
use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const CONNECTION_STRING_ENV: &str = "MONGODB_CONNECTION_STRING";
pub const CONNECTION_STRING_BASE64_ENV: &str = "MONGODB_CONNECTION_STRING_BASE64";
/// Key of the document store entry in `repository.connection_strings`.
pub const CONNECTION_STRING_NAME: &str = "mongodb";
/// Template tokens that mean the connection string was never filled in.
pub const PLACEHOLDER_TOKENS: [&str; 2] = ["<password>", "<db_password>"];
pub const DEFAULT_DATABASE_NAME: &str = "cloudsoft";
pub const DEFAULT_COLLECTION_NAME: &str = "Subscribers";

/// A snapshot of the process environment, taken once so resolution is repeatable.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentVariables(HashMap<String, String>);

impl EnvironmentVariables {
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvironmentVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Where the remote subscriber collection lives.
pub struct ConnectionDescriptor {
    pub connection_string: Secret<String>,
    pub database_name: String,
    pub collection_name: String,
}

impl ConnectionDescriptor {
    fn new(connection_string: Secret<String>, settings: &MongoDbSettings) -> Self {
        Self {
            connection_string,
            database_name: non_blank(settings.database_name.as_deref())
                .unwrap_or(DEFAULT_DATABASE_NAME)
                .to_string(),
            collection_name: non_blank(settings.collection_name.as_deref())
                .unwrap_or(DEFAULT_COLLECTION_NAME)
                .to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A connection string together with the source it came from.
#[derive(Debug)]
pub struct ResolvedConnectionString {
    pub value: Secret<String>,
    pub source: &'static str,
}

type ConnectionStringSource = fn(&RepositorySettings, &EnvironmentVariables) -> Option<String>;

/// Tried in order; the first usable value wins.
const CONNECTION_STRING_SOURCES: [(&str, ConnectionStringSource); 4] = [
    ("configuration key", from_configuration_key),
    ("connection strings section", from_connection_strings_section),
    ("environment variable", from_environment_variable),
    ("base64 environment variable", from_base64_environment_variable),
];

fn from_configuration_key(
    settings: &RepositorySettings,
    _env: &EnvironmentVariables,
) -> Option<String> {
    settings
        .mongodb
        .connection_string
        .as_ref()
        .map(|s| s.expose_secret().clone())
}

fn from_connection_strings_section(
    settings: &RepositorySettings,
    _env: &EnvironmentVariables,
) -> Option<String> {
    settings
        .connection_strings
        .get(CONNECTION_STRING_NAME)
        .map(|s| s.expose_secret().clone())
}

fn from_environment_variable(
    _settings: &RepositorySettings,
    env: &EnvironmentVariables,
) -> Option<String> {
    env.get(CONNECTION_STRING_ENV).map(ToString::to_string)
}

fn from_base64_environment_variable(
    _settings: &RepositorySettings,
    env: &EnvironmentVariables,
) -> Option<String> {
    let encoded = env.get(CONNECTION_STRING_BASE64_ENV)?;
    let decoded = match base64::decode(encoded.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                error.message = %e,
                "Failed to decode {}. Ignoring it",
                CONNECTION_STRING_BASE64_ENV
            );
            return None;
        }
    };
    match String::from_utf8(decoded) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                error.message = %e,
                "{} does not decode to UTF-8 text. Ignoring it",
                CONNECTION_STRING_BASE64_ENV
            );
            None
        }
    }
}

fn contains_placeholder(connection_string: &str) -> bool {
    PLACEHOLDER_TOKENS
        .iter()
        .any(|token| connection_string.contains(token))
}

/// Walks the sources in order and returns the first non-blank connection string that has no
/// placeholder token left in it.
pub fn resolve_connection_string(
    settings: &RepositorySettings,
    env: &EnvironmentVariables,
) -> Option<ResolvedConnectionString> {
    CONNECTION_STRING_SOURCES
        .iter()
        .find_map(|&(source, resolve)| {
            let candidate = resolve(settings, env)?;
            if candidate.trim().is_empty() {
                return None;
            }
            if contains_placeholder(&candidate) {
                tracing::warn!(
                    source,
                    "The connection string still contains a placeholder token. Ignoring it"
                );
                return None;
            }
            Some(ResolvedConnectionString {
                value: Secret::new(candidate),
                source,
            })
        })
}

/// What the selector decided, kept for the lifetime of the process.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SelectionState {
    /// The `repository.kind` setting as configured.
    pub requested_kind: String,
    pub backend: BackendKind,
    /// Whether the backend in use answered (in-memory always does).
    pub live: bool,
    pub database_name: Option<String>,
    pub collection_name: Option<String>,
    pub connection_string_source: Option<&'static str>,
    pub connection_string_length: Option<usize>,
    /// Why the requested backend was not used, if it wasn't.
    pub fallback_reason: Option<String>,
}

pub struct SelectedRepository {
    pub repository: Arc<dyn SubscriberRepository>,
    pub state: SelectionState,
}

#[derive(thiserror::Error)]
enum BootstrapError {
    #[error("{0}")]
    UnknownKind(String),
    #[error("No usable document store connection string was found.")]
    MissingConnectionString,
    #[error("Failed to connect to the document store.")]
    Connect(#[source] RepositoryError),
    #[error("The document store liveness probe failed.")]
    Probe(#[source] RepositoryError),
    #[error("The document store did not answer within {0:?}.")]
    TimedOut(Duration),
}

impl std::fmt::Debug for BootstrapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Resolves the configured backend and returns a live repository, degrading to the in-memory
/// backend on any failure. Meant to run exactly once, before the first request is served.
#[tracing::instrument(
    name = "Selecting the subscriber repository",
    skip(settings, env, connector),
    fields(requested_kind = %settings.kind)
)]
pub async fn select_repository(
    settings: &RepositorySettings,
    env: &EnvironmentVariables,
    connector: &dyn DocumentStoreConnector,
) -> SelectedRepository {
    let mut state = SelectionState {
        requested_kind: settings.kind.clone(),
        backend: BackendKind::InMemory,
        live: true,
        database_name: None,
        collection_name: None,
        connection_string_source: None,
        connection_string_length: None,
        fallback_reason: None,
    };

    match try_select(settings, env, connector, &mut state).await {
        Ok(repository) => {
            tracing::info!(backend = state.backend.as_str(), "Subscriber repository selected");
            SelectedRepository { repository, state }
        }
        Err(e) => {
            match e {
                BootstrapError::UnknownKind(_) | BootstrapError::MissingConnectionString => {
                    tracing::warn!(error.message = %e, "Falling back to the in-memory repository")
                }
                _ => tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Falling back to the in-memory repository"
                ),
            }
            state.backend = BackendKind::InMemory;
            state.live = true;
            state.fallback_reason = Some(e.to_string());
            SelectedRepository {
                repository: Arc::new(InMemorySubscriberRepository::new()),
                state,
            }
        }
    }
}

async fn try_select(
    settings: &RepositorySettings,
    env: &EnvironmentVariables,
    connector: &dyn DocumentStoreConnector,
    state: &mut SelectionState,
) -> Result<Arc<dyn SubscriberRepository>, BootstrapError> {
    let kind = BackendKind::try_from(settings.kind.clone()).map_err(BootstrapError::UnknownKind)?;
    if !kind.is_remote() {
        return Ok(Arc::new(InMemorySubscriberRepository::new()));
    }

    let resolved =
        resolve_connection_string(settings, env).ok_or(BootstrapError::MissingConnectionString)?;
    tracing::info!(
        source = resolved.source,
        length = resolved.value.expose_secret().len(),
        "Resolved the document store connection string"
    );
    let descriptor = ConnectionDescriptor::new(resolved.value, &settings.mongodb);
    state.connection_string_source = Some(resolved.source);
    state.connection_string_length = Some(descriptor.connection_string.expose_secret().len());
    state.database_name = Some(descriptor.database_name.clone());
    state.collection_name = Some(descriptor.collection_name.clone());

    let repository =
        connect_and_probe(kind, &descriptor, connector, settings.probe_timeout()).await?;
    state.backend = kind;
    Ok(repository)
}

async fn connect_and_probe(
    kind: BackendKind,
    descriptor: &ConnectionDescriptor,
    connector: &dyn DocumentStoreConnector,
    timeout: Duration,
) -> Result<Arc<dyn SubscriberRepository>, BootstrapError> {
    let attempt = async {
        let collection = connector
            .connect(descriptor)
            .await
            .map_err(BootstrapError::Connect)?;
        let repository: Arc<dyn SubscriberRepository> = match kind {
            BackendKind::Cosmos => Arc::new(CosmosSubscriberRepository::new(collection.clone())),
            _ => Arc::new(MongoSubscriberRepository::new(collection.clone())),
        };
        let count = collection.count().await.map_err(BootstrapError::Probe)?;
        tracing::info!(subscriber_count = count, "The document store is reachable");
        // Only once the store has answered: an unreachable server must fail the probe, not this.
        collection.ensure_unique_email_index().await;
        Ok(repository)
    };
    tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| BootstrapError::TimedOut(timeout))?
}
