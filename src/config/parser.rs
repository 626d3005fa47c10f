use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Values supplied on the command line (or via environment) that take
/// precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub quota: Option<usize>,
    pub max_pages: Option<u32>,
    pub output: Option<String>,
    pub modifiers: Option<String>,
}

impl ConfigOverrides {
    /// Writes every provided override into `config`
    pub fn apply(self, config: &mut Config) {
        if let Some(url) = self.backend_url {
            config.backend.url = url;
        }
        if let Some(quota) = self.quota {
            config.campaign.quota = quota;
        }
        if let Some(max_pages) = self.max_pages {
            config.campaign.max_pages = max_pages;
        }
        if let Some(output) = self.output {
            config.output.filename = output;
        }
        if let Some(modifiers) = self.modifiers {
            config.modifiers.path = modifiers;
        }
    }
}

/// Reads and parses a configuration file without validating it
pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use query_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Quota per query: {}", config.campaign.quota);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = parse_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Stored in checkpoints to detect configuration changes between runs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Builds the effective configuration for a run
///
/// Starts from the file at `path` (or the built-in defaults when no file is
/// given), applies `overrides`, then validates the result.
///
/// # Returns
///
/// * `Ok((Config, Option<String>))` - The configuration and the file hash, if a file was read
/// * `Err(ConfigError)` - Failed to read, parse, or validate
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(Config, Option<String>), ConfigError> {
    let (mut config, hash) = match path {
        Some(path) => (parse_config(path)?, Some(compute_config_hash(path)?)),
        None => (Config::default(), None),
    };

    overrides.apply(&mut config);
    validate(&config)?;

    Ok((config, hash))
}
