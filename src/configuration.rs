use crate::provider::{ForwardingKind, SignupProvider};
use anyhow::Context;
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::Path;
use std::time::Duration;

#[derive(serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub signup: SignupSettings,
    pub provider: ProviderSettings,
}

impl Settings {
    pub fn get_configuration() -> Result<Settings, config::ConfigError> {
        let base_path = std::env::current_dir().map_err(|e| {
            config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
        })?;
        let config_dir = base_path.join("configuration");

        let env: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or(Environment::Local.as_str().into())
            .try_into()
            .map_err(config::ConfigError::Message)?;

        Self::load(&config_dir, env)
    }

    fn load(config_dir: &Path, env: Environment) -> Result<Settings, config::ConfigError> {
        // Read the configuration from the file
        // supported file extensions: json, toml, yaml, etc
        config::Config::builder()
            .add_source(config::File::from(config_dir.join("share")))
            // ConfigBuilder will merge multiple sources to one when build
            .add_source(config::File::from(config_dir.join(env.as_str())))
            // Secrets and deploy-specific values come from the environment
            // e.g. APP_PROVIDER__API_KEY=... sets provider.api_key
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            // Deserialize the configuration into a Settings struct
            .try_deserialize()
    }
}

#[derive(serde::Deserialize)]
pub struct ApplicationSettings {
    pub name: String,
    pub default_log_level: String,
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn get_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where the landing page's email form posts to, and how it behaves.
#[derive(serde::Deserialize)]
pub struct SignupSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub provider: SignupProvider,
    #[serde(default)]
    pub groups: Vec<String>,
    pub source_tag: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub display_window_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_millis: u64,
}

impl SignupSettings {
    /// Browsers may be given a same-origin path such as `/api/subscribe`;
    /// a submitter running outside the page needs an absolute URL.
    pub fn endpoint(&self) -> Result<reqwest::Url, anyhow::Error> {
        reqwest::Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid signup endpoint: {}", self.endpoint))
    }

    pub fn display_window(&self) -> Duration {
        Duration::from_millis(self.display_window_millis)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

/// Where the internal subscribe route forwards accepted signups.
#[derive(serde::Deserialize)]
pub struct ProviderSettings {
    pub kind: ForwardingKind,
    pub api_base_url: String,
    pub api_key: Secret<String>,
    pub group_id: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_millis: u64,
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

enum Environment {
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
        match s.as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!("Invalid APP_ENVIRONMENT: {}", other)),
        }
    }
}
