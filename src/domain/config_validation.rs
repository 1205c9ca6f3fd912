//! Configuration validation.
//!
//! Validates all config fields before any adapter is built.

use crate::domain::error::TradesimError;
use crate::ports::config_port::ConfigPort;

pub const MAX_POOL_SIZE: i64 = 64;

/// Where quotes are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Csv,
    Sqlite,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    match data_source(config)? {
        DataSource::Csv => validate_csv(config)?,
        DataSource::Sqlite => validate_sqlite(config)?,
    }
    validate_default_principal(config)?;
    validate_listen(config)?;
    Ok(())
}

pub fn data_source(config: &dyn ConfigPort) -> Result<DataSource, TradesimError> {
    let value = config
        .get_string("data", "source")
        .ok_or_else(|| TradesimError::ConfigMissing {
            section: "data".to_string(),
            key: "source".to_string(),
        })?;
    match value.trim().to_lowercase().as_str() {
        "csv" => Ok(DataSource::Csv),
        "sqlite" => Ok(DataSource::Sqlite),
        other => Err(TradesimError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source '{}', expected csv or sqlite", other),
        }),
    }
}

fn validate_csv(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    require_non_empty(config, "csv", "path")
}

fn validate_sqlite(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    require_non_empty(config, "sqlite", "path")?;
    let pool_size = config.get_int("sqlite", "pool_size", 4);
    if !(1..=MAX_POOL_SIZE).contains(&pool_size) {
        return Err(TradesimError::ConfigInvalid {
            section: "sqlite".to_string(),
            key: "pool_size".to_string(),
            reason: format!("pool_size must be between 1 and {}", MAX_POOL_SIZE),
        });
    }
    Ok(())
}

fn validate_default_principal(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    if config.get_string("simulation", "principal").is_none() {
        return Ok(());
    }
    let value = config.get_double("simulation", "principal", f64::NAN);
    if !value.is_finite() || value <= 0.0 {
        return Err(TradesimError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "principal".to_string(),
            reason: "principal must be a positive number".to_string(),
        });
    }
    Ok(())
}

fn validate_listen(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    match config.get_string("web", "listen") {
        None => Ok(()),
        Some(s) => s
            .trim()
            .parse::<std::net::SocketAddr>()
            .map(|_| ())
            .map_err(|_| TradesimError::ConfigInvalid {
                section: "web".to_string(),
                key: "listen".to_string(),
                reason: format!("'{}' is not a socket address", s.trim()),
            }),
    }
}

fn require_non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), TradesimError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TradesimError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}
