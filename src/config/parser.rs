use crate::config::types::{Config, Overrides};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

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
/// use sitemap_weaver::config::load_config;
///
/// let config = load_config(Path::new("sitemap.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Parses TOML content without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs can be matched to the same settings.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Builds the effective configuration from an optional file plus CLI overrides
///
/// The file (if any) is read first, then `overrides` are applied, then the
/// merged result is validated. A seed URL is required after merging.
///
/// # Returns
///
/// * `Ok((Config, Option<String>))` - Effective config and the file hash, if a file was read
/// * `Err(ConfigError)` - Failed to read, parse, or validate
pub fn resolve_config(
    path: Option<&Path>,
    overrides: Overrides,
) -> Result<(Config, Option<String>), ConfigError> {
    let (mut config, hash) = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let config = parse_config(&content)?;
            (config, Some(compute_config_hash(path)?))
        }
        None => (Config::default(), None),
    };

    config.apply_overrides(overrides);

    if config.crawler.url.is_none() {
        return Err(ConfigError::MissingSeed);
    }

    validate(&config)?;

    Ok((config, hash))
}
