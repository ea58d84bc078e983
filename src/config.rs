use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Environment used when the requested one is absent or unknown.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Variable naming the environment to run in.
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

/// Variable pointing at a YAML file that replaces the built-in environments.
pub const ENVIRONMENTS_FILE_VAR: &str = "SWITCHYARD_ENVIRONMENTS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpsConfig {
    pub port: u16,
    pub key: PathBuf,
    pub cert: PathBuf,
}

/// Ports, TLS files and label for one deployment environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Environment {
    pub port: u16,
    pub https: HttpsConfig,
    /// Label reported when the servers start listening
    pub env: String,
    /// Optional bound on request body arrival, in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Environment {
    fn builtin(port: u16, https_port: u16, label: &str) -> Self {
        Self {
            port,
            https: HttpsConfig {
                port: https_port,
                key: PathBuf::from("./https/key.pem"),
                cert: PathBuf::from("./https/cert.pem"),
            },
            env: label.to_string(),
            request_timeout_secs: None,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Named environments to choose from at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environments(HashMap<String, Environment>);

impl Environments {
    /// `dev`, `staging` and `production`.
    pub fn builtin() -> Self {
        let mut table = HashMap::new();
        table.insert("dev".to_string(), Environment::builtin(3000, 3001, "dev"));
        table.insert(
            "staging".to_string(),
            Environment::builtin(5000, 5001, "staging"),
        );
        table.insert(
            "production".to_string(),
            Environment::builtin(80, 443, "prod"),
        );
        Self(table)
    }

    /// Parses a YAML mapping of environment name to settings.
    ///
    /// Names are lower-cased; the table must define the default environment.
    pub fn from_yaml(source: &str) -> anyhow::Result<Self> {
        let raw: HashMap<String, Environment> =
            serde_yaml::from_str(source).context("invalid environments YAML")?;
        let table: HashMap<String, Environment> = raw
            .into_iter()
            .map(|(name, env)| (name.to_lowercase(), env))
            .collect();
        if !table.contains_key(DEFAULT_ENVIRONMENT) {
            anyhow::bail!("environments table must define `{DEFAULT_ENVIRONMENT}`");
        }
        Ok(Self(table))
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read environments file {}", path.display()))?;
        Self::from_yaml(&source).with_context(|| format!("in {}", path.display()))
    }

    /// Picks an environment by case-insensitive name.
    ///
    /// Returns the resolved name with the environment; unknown or missing
    /// names resolve to the default.
    pub fn select(&self, name: Option<&str>) -> (String, Environment) {
        let requested = name.map(str::to_lowercase);
        let resolved = match requested {
            Some(name) if self.0.contains_key(&name) => name,
            Some(name) => {
                tracing::warn!(
                    requested = %name,
                    "unknown environment, falling back to {}",
                    DEFAULT_ENVIRONMENT
                );
                DEFAULT_ENVIRONMENT.to_string()
            }
            None => DEFAULT_ENVIRONMENT.to_string(),
        };
        let env = self
            .0
            .get(&resolved)
            .or_else(|| self.0.get(DEFAULT_ENVIRONMENT))
            .cloned()
            .unwrap_or_else(|| Environment::builtin(3000, 3001, DEFAULT_ENVIRONMENT));
        (resolved, env)
    }

    pub fn get(&self, name: &str) -> Option<&Environment> {
        self.0.get(&name.to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Resolved environment name
    pub name: String,
    pub environment: Environment,
}

impl Config {
    /// Resolves the environment from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        let environments = match std::env::var_os(ENVIRONMENTS_FILE_VAR) {
            Some(path) => Environments::from_file(Path::new(&path))?,
            None => Environments::builtin(),
        };
        let requested = std::env::var(ENVIRONMENT_VAR).ok();
        Ok(Self::select(&environments, requested.as_deref()))
    }

    pub fn select(environments: &Environments, name: Option<&str>) -> Self {
        let (name, environment) = environments.select(name);
        Self { name, environment }
    }
}
