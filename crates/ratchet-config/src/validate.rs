//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, StorageBackend};

/// Accepted `logging.level` values.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Accepted `logging.format` values.
pub const LOG_FORMATS: [&str; 4] = ["pretty", "compact", "json", "full"];

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_storage(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_storage(config: &Config) -> ConfigResult<()> {
    if config.storage.backend == StorageBackend::File && config.storage.path.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError {
            field: "storage.path".to_owned(),
            message: "the file backend needs a directory".to_owned(),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !LOG_LEVELS.contains(&l.level.to_lowercase().as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unknown level '{}'; expected one of: {}",
                l.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if !LOG_FORMATS.contains(&l.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unknown format '{}'; expected one of: {}",
                l.format,
                LOG_FORMATS.join(", ")
            ),
        });
    }

    if let Some(bad) = l
        .directives
        .iter()
        .find(|d| d.trim().is_empty() || d.contains(char::is_whitespace))
    {
        return Err(ConfigError::ValidationError {
            field: "logging.directives".to_owned(),
            message: format!("invalid directive '{bad}'"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.storage.path = "/var/lib/ratchet".into();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid()).is_ok());
    }

    #[test]
    fn test_file_backend_requires_path() {
        let config = Config::default();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. } if field == "storage.path"));
    }

    #[test]
    fn test_memory_backend_needs_no_path() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_unknown_level_and_format() {
        let mut config = valid();
        config.logging.level = "loud".to_owned();
        assert!(validate(&config).is_err());

        let mut config = valid();
        config.logging.format = "xml".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_level_is_case_insensitive() {
        let mut config = valid();
        config.logging.level = "DEBUG".to_owned();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_blank_directive() {
        let mut config = valid();
        config.logging.directives = vec!["ratchet_store=debug".to_owned(), " ".to_owned()];
        assert!(validate(&config).is_err());
    }
}
