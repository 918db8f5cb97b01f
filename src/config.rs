use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;

// ============================================================================
// Deploy Config
// ============================================================================

/// Deployment settings for one application checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// Git checkout holding the requirements files
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Root requirements files, in install priority order
    #[serde(default = "default_requirements")]
    pub requirements: Vec<String>,

    /// How to invoke pip
    #[serde(default)]
    pub pip: PipConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipConfig {
    /// pip executable, used when no virtualenv is set
    #[serde(default = "default_pip")]
    pub command: String,

    /// Virtualenv whose `bin/pip` should be used
    #[serde(default)]
    pub virtualenv: Option<String>,

    /// Extra arguments passed to every `pip install`
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_repository() -> String {
    ".".to_string()
}

fn default_requirements() -> Vec<String> {
    vec!["requirements.txt".to_string()]
}

fn default_pip() -> String {
    "pip".to_string()
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            requirements: default_requirements(),
            pip: PipConfig::default(),
        }
    }
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            command: default_pip(),
            virtualenv: None,
            args: Vec::new(),
        }
    }
}

impl DeployConfig {
    /// Load the config, falling back to defaults when no file exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = paths::config_file(explicit)?;

        if !path.exists() {
            if explicit.is_some() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid TOML format")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.requirements.is_empty() {
            anyhow::bail!("At least one requirements file must be configured");
        }
        if self.requirements.iter().any(|r| r.trim().is_empty()) {
            anyhow::bail!("Requirements file path cannot be empty");
        }
        if self.pip.command.trim().is_empty() {
            anyhow::bail!("pip command cannot be empty");
        }
        Ok(())
    }

    /// Get the expanded repository path
    pub fn repository_path(&self) -> PathBuf {
        paths::expand(&self.repository)
    }
}

impl PipConfig {
    /// The pip executable to run
    pub fn executable(&self) -> String {
        match &self.virtualenv {
            Some(venv) => paths::expand(venv)
                .join("bin")
                .join("pip")
                .to_string_lossy()
                .into_owned(),
            None => self.command.clone(),
        }
    }
}
