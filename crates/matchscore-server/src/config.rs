//! Server configuration

use crate::cli::Cli;
use matchscore_model::artifact::{ArtifactPaths, DEFAULT_FEATURES_PATH, DEFAULT_MODEL_PATH};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment root for relative artifact paths
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Classifier artifact, relative to `root` unless absolute
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Feature schema artifact, relative to `root` unless absolute
    #[serde(default = "default_features_path")]
    pub features_path: PathBuf,

    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsConfig,

    /// Maximum accepted request body size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(root) = &cli.root {
            config.root = root.clone();
        }
        if let Some(model) = &cli.model {
            config.model_path = model.clone();
        }
        if let Some(features) = &cli.features {
            config.features_path = features.clone();
        }

        Ok(config)
    }

    /// Artifact locations resolved against the deployment root
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::resolve(&self.root, &self.model_path, &self.features_path)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.listen, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            root: default_root(),
            model_path: default_model_path(),
            features_path: default_features_path(),
            cors: CorsConfig::default(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allow every origin, method and header
    #[serde(default = "default_true")]
    pub allow_any_origin: bool,

    /// Origins allowed when `allow_any_origin` is off
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: true,
            allowed_origins: Vec::new(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

fn default_features_path() -> PathBuf {
    PathBuf::from(DEFAULT_FEATURES_PATH)
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_true() -> bool {
    true
}
