use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::collections::HashMap;
use std::time::Duration;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    #[serde(default)]
    pub repository: RepositorySettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

/// Everything the backend selector reads from the configuration files.
#[derive(serde::Deserialize, Clone)]
pub struct RepositorySettings {
    /// `inmemory`, `mongo` or `cosmos`, compared case-insensitively.
    #[serde(default = "default_repository_kind")]
    pub kind: String,
    #[serde(default)]
    pub mongodb: MongoDbSettings,
    /// Named connection strings. The selector looks up the `mongodb` entry.
    #[serde(default)]
    pub connection_strings: HashMap<String, Secret<String>>,
    #[serde(
        default = "default_probe_timeout_seconds",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub probe_timeout_seconds: u64,
}

#[derive(serde::Deserialize, Clone, Default)]
pub struct MongoDbSettings {
    pub connection_string: Option<Secret<String>>,
    pub database_name: Option<String>,
    pub collection_name: Option<String>,
}

fn default_repository_kind() -> String {
    "inmemory".into()
}

fn default_probe_timeout_seconds() -> u64 {
    5
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            kind: default_repository_kind(),
            mongodb: MongoDbSettings::default(),
            connection_strings: HashMap::new(),
            probe_timeout_seconds: default_probe_timeout_seconds(),
        }
    }
}

impl RepositorySettings {
    /// Upper bound on connecting to the document store and running the liveness probe.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    /// How long the driver may spend looking for a server. Kept below `probe_timeout` so an
    /// unreachable store surfaces the driver's own error instead of the outer timeout.
    pub fn server_selection_timeout(&self) -> Duration {
        self.probe_timeout().mul_f64(0.8)
    }
}

/// Layers `base.yaml`, the environment-specific file and `APP_`-prefixed environment variables,
/// in that order. E.g. `APP_REPOSITORY__KIND=mongo` sets `Settings.repository.kind`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment. Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The possible runtime environment for our application.
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. Use either `local` or `production`."
            )),
        }
    }
}
