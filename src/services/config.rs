//! Configuration service for Symquery

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ConfigError;
use crate::models::config::SymqueryConfig;

#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn load(&self, global_only: bool) -> Result<SymqueryConfig, ConfigError>;
    fn config_path(&self, global: bool) -> PathBuf;
    async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError>;
}

pub struct DefaultConfigService {
    root: PathBuf,
    global_path: PathBuf,
}

impl DefaultConfigService {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            global_path: Self::global_config_path(),
        }
    }

    /// Use an explicit global config location instead of the XDG one
    pub fn with_global_path(root: &Path, global_path: PathBuf) -> Self {
        Self {
            root: root.to_path_buf(),
            global_path,
        }
    }

    fn global_config_path() -> PathBuf {
        // XDG standard: ~/.config/symquery/config.toml
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("symquery")
            .join("config.toml")
    }

    fn project_config_path(&self) -> PathBuf {
        self.root.join(".symquery").join("config.toml")
    }

    async fn load_from_path(path: &Path) -> Result<Option<SymqueryConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(path).await?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    async fn write_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let config = SymqueryConfig::default();
        let content =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigService for DefaultConfigService {
    async fn load(&self, global_only: bool) -> Result<SymqueryConfig, ConfigError> {
        if global_only {
            return Ok(Self::load_from_path(&self.global_path)
                .await?
                .unwrap_or_default());
        }

        let config = match Self::load_from_path(&self.project_config_path()).await? {
            Some(project) => project,
            None => Self::load_from_path(&self.global_path)
                .await?
                .unwrap_or_default(),
        };
        apply_env_overrides(config, |key| std::env::var(key).ok())
    }

    fn config_path(&self, global: bool) -> PathBuf {
        if global {
            self.global_path.clone()
        } else {
            self.project_config_path()
        }
    }

    async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError> {
        let path = self.config_path(global);

        if path.exists() && !force {
            return Err(ConfigError::InvalidValue {
                key: "config".to_string(),
                message: format!(
                    "Config already exists: {}. Use --force to overwrite.",
                    path.display()
                ),
            });
        }

        Self::write_default_config(&path).await?;
        Ok(path)
    }
}

fn apply_env_overrides(
    mut config: SymqueryConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<SymqueryConfig, ConfigError> {
    if let Some(val) = var("SYMQUERY_OUTPUT_FORMAT") {
        config.output.format = val;
    }
    if let Some(val) = var("SYMQUERY_WINDOW_LINES") {
        config.query.window_lines = val.parse().map_err(|_| ConfigError::InvalidValue {
            key: "SYMQUERY_WINDOW_LINES".to_string(),
            message: format!("expected an integer, got '{}'", val),
        })?;
    }
    if let Some(val) = var("SYMQUERY_LSP_TIMEOUT") {
        config.lsp.timeout_secs = val.parse().map_err(|_| ConfigError::InvalidValue {
            key: "SYMQUERY_LSP_TIMEOUT".to_string(),
            message: format!("expected seconds, got '{}'", val),
        })?;
    }
    Ok(config)
}
