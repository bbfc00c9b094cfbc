//! JSON persistence for [`TransmitterConfig`].
//!
//! A missing file is an error here; callers decide whether to fall back to
//! `TransmitterConfig::default()`.

use std::fs;
use std::path::Path;

use super::TransmitterConfig;
use crate::error::ConfigError;

/// Load and validate a configuration file.
pub fn load(path: impl AsRef<Path>) -> Result<TransmitterConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let config = TransmitterConfig::from_json(&text).map_err(|e| {
        log::warn!("rejecting config {}: {}", path.display(), e);
        e
    })?;
    log::info!("loaded transmitter config from {}", path.display());
    Ok(config)
}

/// Validate and write a configuration file, replacing any existing one.
pub fn save(path: impl AsRef<Path>, config: &TransmitterConfig) -> Result<(), ConfigError> {
    config.validate()?;
    let path = path.as_ref();
    fs::write(path, config.to_json()?)?;
    log::debug!("saved transmitter config to {}", path.display());
    Ok(())
}
