//! Environment selection and mock gating.
//!
//! A `Configuration` is an ordinary value handed to each `Service`. The
//! process-wide default returned by `Configuration::shared` is published once
//! and never changes afterwards.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENVIRONMENT_VAR: &str = "GISTVIEW_ENVIRONMENT";
pub const ENABLE_MOCKS_VAR: &str = "GISTVIEW_ENABLE_MOCKS";

static SHARED: OnceLock<Configuration> = OnceLock::new();

/// Deployment target; selects the base URL services talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    /// Points at a locally running `mock-server` on its default port.
    Development,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.github.com",
            Environment::Development => "http://127.0.0.1:3000",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "development" => Ok(Environment::Development),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub environment: Environment,
    /// Serve endpoint mock payloads instead of calling the transport.
    pub enable_mocks: bool,
}

impl Configuration {
    pub fn new(environment: Environment, enable_mocks: bool) -> Self {
        Self {
            environment,
            enable_mocks,
        }
    }

    /// The process-wide default, initialized to `Configuration::default()` on
    /// first read unless `install_shared` ran earlier.
    pub fn shared() -> &'static Configuration {
        SHARED.get_or_init(Configuration::default)
    }

    /// Publish `configuration` as the process-wide default.
    ///
    /// Succeeds only before the shared value is first read or installed;
    /// otherwise the rejected configuration is handed back.
    pub fn install_shared(configuration: Configuration) -> Result<(), Configuration> {
        SHARED.set(configuration)
    }

    /// Load from `GISTVIEW_ENVIRONMENT` and `GISTVIEW_ENABLE_MOCKS`. Unset
    /// variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut configuration = Configuration::default();
        if let Some(value) = lookup(ENVIRONMENT_VAR) {
            configuration.environment = value.parse()?;
        }
        if let Some(value) = lookup(ENABLE_MOCKS_VAR) {
            configuration.enable_mocks = parse_flag(ENABLE_MOCKS_VAR, &value)?;
        }
        Ok(configuration)
    }
}

fn parse_flag(variable: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            variable,
            value: value.to_string(),
        }),
    }
}
