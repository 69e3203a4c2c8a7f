//! Application container for Symquery

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::{OutputContext, OutputFormat};
use crate::config;
use crate::models::config::SymqueryConfig;
use crate::services::config::{ConfigService, DefaultConfigService};

pub struct App {
    root: PathBuf,
    pub(crate) output: OutputContext,
    pub(crate) config_service: Arc<dyn ConfigService>,
    pub(crate) config: SymqueryConfig,
}

impl App {
    /// `format` overrides `output.format` from the configuration
    pub async fn new(format: Option<&str>) -> anyhow::Result<Self> {
        let root = std::env::current_dir()?;

        tracing::debug!("Initializing Symquery at {:?}", root);

        let config_service = Arc::new(DefaultConfigService::new(&root));
        let config = match config_service.load(false).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring configuration: {}", e);
                SymqueryConfig::default()
            }
        };

        config::init(&config);

        let format: OutputFormat = format
            .unwrap_or(config.output.format.as_str())
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        let output = OutputContext::new(root.clone(), format);

        Ok(Self {
            root,
            output,
            config_service,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SymqueryConfig {
        &self.config
    }
}
