use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Whether `logging.enabled = true` is set in the config file at `path`.
///
/// Only that one key is looked up, so a config that fails full validation
/// can still turn logging on and have the failure logged.
pub fn file_logging_requested(path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(table) = content.parse::<toml::Table>() else {
        return false;
    };

    table
        .get("logging")
        .and_then(|logging| logging.get("enabled"))
        .and_then(toml::Value::as_bool)
        .unwrap_or(false)
}

/// Initialize tracing.
///
/// The terminal belongs to the UI, so there is no console layer: events go to
/// the log file when enabled and are dropped otherwise.
pub fn init_tracing(file_logging_enabled: bool) {
    if !file_logging_enabled {
        return;
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_path = lyrisync_core::paths::log_file_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match File::create(&log_path) {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .init();
        }
        Err(e) => {
            // Still on the normal screen at this point
            eprintln!("Failed to create log file at {}: {e}", log_path.display());
        }
    }
}
