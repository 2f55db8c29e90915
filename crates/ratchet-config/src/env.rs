//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only fill fields that no
//! config file set. Defaults do not count as set.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources};
use crate::types::StorageBackend;

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `RATCHET_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "RATCHET_STORAGE_BACKEND",
        field_path: "storage.backend",
    },
    EnvMapping {
        var_name: "RATCHET_STORAGE_PATH",
        field_path: "storage.path",
    },
    EnvMapping {
        var_name: "RATCHET_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "RATCHET_LOG_FORMAT",
        field_path: "logging.format",
    },
];

/// Apply environment variable fallbacks to fields that no config file set.
///
/// Returns the number of env vars applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if `RATCHET_STORAGE_BACKEND` names an
/// unknown backend.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if matches!(sources.get(mapping.field_path), Some(ConfigLayer::File(_))) {
            continue;
        }
        let Some(val) = env_vars.get(mapping.var_name) else {
            continue;
        };

        if mapping.field_path == "storage.backend" && StorageBackend::from_name(val).is_none() {
            return Err(ConfigError::EnvError {
                var_name: mapping.var_name.to_owned(),
                message: format!("unknown backend '{val}'; expected 'memory' or 'file'"),
            });
        }

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        set_field(merged, mapping.field_path, val);
        sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
        count = count.saturating_add(1);
    }

    Ok(count)
}

/// Set a dotted `section.field` path in the TOML tree to a string value,
/// creating the section if needed.
fn set_field(root: &mut toml::Value, path: &str, val: &str) {
    let Some((section, field)) = path.split_once('.') else {
        return;
    };
    let Some(root) = root.as_table_mut() else {
        return;
    };
    let section = root
        .entry(section.to_owned())
        .or_insert(toml::Value::Table(toml::map::Map::new()));
    if let Some(table) = section.as_table_mut() {
        table.insert(field.to_owned(), toml::Value::String(val.to_owned()));
    }
}

/// Collect the process environment, skipping entries that are not valid
/// UTF-8.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}
