//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the config file (explicit path, or the platform config dir)
//! 3. Apply env var fallbacks for fields the file left unset
//! 4. Deserialize merged tree → `Config`
//! 5. Fill an empty `storage.path` with the platform data dir
//! 6. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::types::{Config, StorageBackend};
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// A loaded configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config files that were loaded.
    pub loaded_files: Vec<String>,
}

/// Load the configuration with layered precedence, reading the process
/// environment.
///
/// With `config_path` set, that file must exist. Without it, the platform
/// config file (see [`default_config_path`]) is used if present.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the config file is unreadable or malformed,
/// an env var is invalid, or the final configuration fails validation.
pub fn load(config_path: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_with_env(config_path, &collect_env_vars())
}

/// [`load`] with an explicit environment.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<S: ::std::hash::BuildHasher>(
    config_path: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    // 2. Config file.
    let file = match config_path {
        Some(path) => Some((read_file(path)?, path.to_path_buf())),
        None => match default_config_path() {
            Some(path) => try_load_file(&path)?.map(|overlay| (overlay, path)),
            None => None,
        },
    };
    if let Some((overlay, path)) = file {
        let shown = path.display().to_string();
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::File(shown.clone()),
            &mut field_sources,
        );
        info!(path = %shown, "loaded config file");
        loaded_files.push(shown);
    }

    // 3. Env var fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 4. Deserialize.
    let mut config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 5. Default store location.
    if config.storage.backend == StorageBackend::File && config.storage.path.as_os_str().is_empty()
    {
        config.storage.path = default_data_dir()?.join("store");
    }

    // 6. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering, no env).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = read_file(path)?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Platform config file location, e.g. `~/.config/ratchet/config.toml` on
/// Linux.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Platform data directory, e.g. `~/.local/share/ratchet` on Linux.
///
/// # Errors
///
/// Returns [`ConfigError::NoDataDir`] if no home directory can be found.
pub fn default_data_dir() -> ConfigResult<PathBuf> {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .ok_or(ConfigError::NoDataDir)
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "ratchet")
}

/// Read and parse a config file that must exist.
fn read_file(path: &Path) -> ConfigResult<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_content(path, &content)
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };
    parse_content(path, &content).map(Some)
}

fn parse_content(path: &Path, content: &str) -> ConfigResult<toml::Value> {
    // Size is checked after reading to avoid a stat/read race.
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }
    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_deserialize_to_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[storage]\nbackend = \"file\"\npath = \"/srv/ratchet\"\n[logging]\nformat = \"json\"\n",
        );

        let resolved = load_with_env(Some(&path), &env(&[])).unwrap();

        assert_eq!(resolved.config.storage.path, PathBuf::from("/srv/ratchet"));
        assert_eq!(resolved.config.logging.format, "json");
        assert_eq!(resolved.config.logging.level, "info");
        assert_eq!(resolved.loaded_files, vec![path.display().to_string()]);
        assert_eq!(
            resolved.field_sources.get("logging.level"),
            Some(&ConfigLayer::Defaults)
        );
    }

    #[test]
    fn test_env_is_fallback_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[logging]\nlevel = \"warn\"\n");
        let vars = env(&[
            ("RATCHET_LOG_LEVEL", "trace"),
            ("RATCHET_STORAGE_BACKEND", "memory"),
        ]);

        let resolved = load_with_env(Some(&path), &vars).unwrap();

        assert_eq!(resolved.config.logging.level, "warn");
        assert_eq!(resolved.config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_with_env(Some(&dir.path().join("absent.toml")), &env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[storage\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let big = "# padding\n".repeat(120_000);
        let path = write_config(&dir, &big);
        let err = load_with_env(Some(&path), &env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_invalid_value_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[logging]\nlevel = \"chatty\"\n");
        let vars = env(&[("RATCHET_STORAGE_PATH", "/tmp/ratchet")]);
        let err = load_with_env(Some(&path), &vars).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. } if field == "logging.level"));
    }

    #[test]
    fn test_memory_backend_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[storage]\nbackend = \"memory\"\n");
        let config = load_file(&path).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }
}
