use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Rosalution deployment, e.g. "https://local.rosalution.cgds"
    pub base_url: String,

    /// Data directory for storing cached credentials
    pub data_dir: PathBuf,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Default username for login
    pub username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            data_dir: default_data_dir(),
            timeout_seconds: 30,
            username: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("rosalution"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

impl Config {
    /// Initialize configuration from defaults, files and environment
    pub async fn init() -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = Self::default();

        // Try to load from configuration files
        if let Ok(file_config) = Self::load_from_file().await {
            config.merge_with(file_config);
        }

        // Environment variables take precedence over file values
        config.load_from_env();

        // Ensure data directory exists
        if !config.data_dir.exists() {
            std::fs::create_dir_all(&config.data_dir)?;
        }

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        if let Ok(url) = std::env::var("ROSALUTION_URL") {
            self.base_url = url;
        }

        if let Ok(data_dir) = std::env::var("ROSALUTION_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(timeout_str) = std::env::var("ROSALUTION_TIMEOUT") {
            if let Ok(timeout) = timeout_str.parse() {
                self.timeout_seconds = timeout;
            }
        }

        if let Ok(username) = std::env::var("ROSALUTION_USERNAME") {
            self.username = Some(username);
        }
    }

    /// Load configuration from rosalution.json files
    ///
    /// Lookup priority:
    /// 1. ./.rosalution.json
    /// 2. ./rosalution.json
    /// 3. $HOME/.config/rosalution/rosalution.json
    pub async fn load_from_file() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("./.rosalution.json"),
            PathBuf::from("./rosalution.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("rosalution").join("rosalution.json"));
        }

        for path in config_paths {
            if path.exists() {
                debug!("Loading configuration from: {}", path.display());
                let content = tokio::fs::read_to_string(&path).await?;
                let config: Self = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Err(anyhow::anyhow!("No configuration file found"))
    }

    /// Merge another configuration into this one
    pub fn merge_with(&mut self, other: Self) {
        if !other.base_url.is_empty() {
            self.base_url = other.base_url;
        }
        if other.data_dir != default_data_dir() {
            self.data_dir = other.data_dir;
        }
        if other.timeout_seconds != 0 {
            self.timeout_seconds = other.timeout_seconds;
        }
        if other.username.is_some() {
            self.username = other.username;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(anyhow::anyhow!(
                "No base URL configured. Set ROSALUTION_URL or add base_url to rosalution.json"
            ));
        }

        reqwest::Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid base URL '{}': {}", self.base_url, e))?;

        if self.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("timeout_seconds must be greater than 0"));
        }

        Ok(())
    }

    /// Path of the cached session token file
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join("session_token")
    }

    /// Persist the session token for subsequent commands
    pub async fn save_token(&self, token: &str) -> Result<()> {
        tokio::fs::write(self.token_path(), token).await?;
        debug!("Session token saved to {}", self.token_path().display());
        Ok(())
    }

    /// Load a previously persisted session token, if one exists
    pub async fn load_token(&self) -> Option<String> {
        match tokio::fs::read_to_string(self.token_path()).await {
            Ok(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
            _ => None,
        }
    }

    /// Remove the persisted session token
    pub async fn clear_token(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            tokio::fs::remove_file(path).await?;
        }
        Ok(())
    }
}
