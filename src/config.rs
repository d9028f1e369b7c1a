use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid PORT value {0:?}")]
    Port(String),
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactConfig,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory the models directory is looked up from; defaults to the
    /// directory of the running executable.
    pub base_dir: Option<PathBuf>,
    pub models_dir: String,
    pub classifier_file: String,
    pub scaler_file: String,
    /// Keep the first successfully loaded pair instead of reloading per request.
    pub cache: bool,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            models_dir: "models".to_string(),
            classifier_file: "svm_tuned_model.json".to_string(),
            scaler_file: "scaler.json".to_string(),
            cache: false,
        }
    }
}

impl ArtifactConfig {
    pub fn resolved_base_dir(&self) -> PathBuf {
        if let Some(dir) = &self.base_dir {
            return dir.clone();
        }
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl AppConfig {
    /// Reads `CONFIG_PATH` (or `config.yaml` when present), then applies the
    /// `PORT` override.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var("CONFIG_PATH") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };
        config.apply_port(env::var("PORT").ok())?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn apply_port(&mut self, port: Option<String>) -> Result<(), ConfigError> {
        if let Some(raw) = port {
            self.server.port = raw.trim().parse().map_err(|_| ConfigError::Port(raw))?;
        }
        Ok(())
    }
}
