pub mod batch;
pub mod stream;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use codeloop_agent::AgentLoop;
use codeloop_config::{AppConfig, ConfigError};
use codeloop_core::tool::ToolContext;
use codeloop_tools::ShellTool;
use tracing::debug;

/// Flags shared by every command that runs the loop.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Project root the tools operate in (default: current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Maximum completion round trips per task
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Model to request
    #[arg(short, long)]
    pub model: Option<String>,

    /// Config file (default: ~/.codeloop/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl RunOptions {
    /// Load the config file and environment, then apply the flags.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_with_env(path)?,
            None => AppConfig::load()?,
        };
        if let Some(project) = &self.project {
            config.project_root = Some(project.clone());
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = max;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// Build the loop from config: provider, tools and project sandbox.
    pub fn build_agent(&self) -> Result<(AgentLoop, AppConfig), Box<dyn std::error::Error>> {
        let config = self
            .load_config()
            .map_err(|e| format!("Failed to load config: {e}"))?;

        let provider = codeloop_providers::router::build_from_config(&config).map_err(|e| {
            format!(
                "{e}\n  Set CODELOOP_API_KEY (or OPENAI_API_KEY / OPENROUTER_API_KEY), \
                 or add api_key to {}",
                AppConfig::config_dir().join("config.toml").display()
            )
        })?;

        let shell = ShellTool::new(
            config.shell.allowed_commands.clone(),
            Duration::from_secs(config.shell.timeout_secs),
        );
        let tools = Arc::new(codeloop_tools::registry_with_shell(shell));

        let root = config.resolved_project_root();
        let root = root
            .canonicalize()
            .map_err(|e| format!("Invalid project root {}: {e}", root.display()))?;
        debug!(root = %root.display(), model = %config.model, "Agent configured");

        let agent = AgentLoop::from_config(provider, tools, &config, ToolContext::new(root));
        Ok((agent, config))
    }
}
