use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub aws: AwsSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AwsSettings {
    /// AWS region override (e.g., "us-east-1"); defaults to the SDK's
    /// region resolution when unset
    #[serde(default)]
    pub region: Option<String>,
    /// Optional: AWS access key ID (if not using the default credential chain)
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Optional: AWS secret access key (if not using the default credential chain)
    #[serde(default)]
    pub secret_access_key: Option<String>,
}

fn default_max_entries() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    /// Maximum number of registries to hold credentials for (default: 1000)
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Optional configuration file, path given via ECR_LOGIN_CONFIG
        if let Ok(config_file) = env::var("ECR_LOGIN_CONFIG") {
            builder = builder.add_source(File::with_name(&config_file).required(false));
        }

        // Add in settings from the environment (with a prefix of ECR_LOGIN)
        // E.g. `ECR_LOGIN_AWS__REGION=us-east-1` sets the aws region
        builder
            .add_source(Environment::with_prefix("ECR_LOGIN").separator("__"))
            .build()?
            .try_deserialize()
    }
}
