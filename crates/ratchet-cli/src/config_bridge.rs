//! Bridge from `ratchet_config::Config` to store and telemetry types.

use std::path::Path;

use ratchet_config::{Config, StorageBackend};
use ratchet_store::OpenOptions;
use ratchet_telemetry::{LogConfig, LogFormat};

/// Convert config to store [`OpenOptions`].
///
/// `path_override` (the `--path` flag) forces a file backend at that
/// directory regardless of the configured backend.
pub(crate) fn to_open_options(cfg: &Config, path_override: Option<&Path>) -> OpenOptions {
    match (path_override, cfg.storage.backend) {
        (Some(path), _) => OpenOptions::file(path),
        (None, StorageBackend::File) => OpenOptions::file(&cfg.storage.path),
        (None, StorageBackend::Memory) => OpenOptions::memory(),
    }
}

/// Convert config to [`LogConfig`]. `verbose` raises the level to debug.
pub(crate) fn to_log_config(cfg: &Config, verbose: bool) -> LogConfig {
    let format = LogFormat::from_name(&cfg.logging.format).unwrap_or(LogFormat::Compact);
    let level = if verbose {
        "debug"
    } else {
        cfg.logging.level.as_str()
    };

    let mut log_config = LogConfig::new(level).with_format(format);
    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }
    log_config
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ratchet_store::BackendOptions;

    use super::*;

    #[test]
    fn test_file_backend_uses_configured_path() {
        let mut cfg = Config::default();
        cfg.storage.path = PathBuf::from("/srv/ratchet");
        let options = to_open_options(&cfg, None);
        assert_eq!(
            options.backend,
            BackendOptions::File {
                path: PathBuf::from("/srv/ratchet")
            }
        );
    }

    #[test]
    fn test_path_flag_wins() {
        let mut cfg = Config::default();
        cfg.storage.backend = StorageBackend::Memory;
        let options = to_open_options(&cfg, Some(Path::new("/tmp/other")));
        assert_eq!(
            options.backend,
            BackendOptions::File {
                path: PathBuf::from("/tmp/other")
            }
        );
    }

    #[test]
    fn test_memory_backend() {
        let mut cfg = Config::default();
        cfg.storage.backend = StorageBackend::Memory;
        assert_eq!(to_open_options(&cfg, None).backend, BackendOptions::Memory);
    }

    #[test]
    fn test_log_config_from_config() {
        let mut cfg = Config::default();
        cfg.logging.format = "json".to_owned();
        cfg.logging.directives = vec!["ratchet_store=trace".to_owned()];

        let lc = to_log_config(&cfg, false);
        assert_eq!(lc.level, "info");
        assert_eq!(lc.format, LogFormat::Json);
        assert_eq!(lc.directives, vec!["ratchet_store=trace"]);

        assert_eq!(to_log_config(&cfg, true).level, "debug");
    }
}
