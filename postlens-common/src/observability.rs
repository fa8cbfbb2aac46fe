//! Shared observability helpers for binaries and integration tests.
//!
//! [`init_logging`] installs the process-wide `tracing` subscriber: a daily
//! rolling file sink, optionally mirrored to `stderr`, encoded as text or
//! JSON. Call it once near process start; later calls are no-ops that hand
//! back the resolved log file path.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Environment variable consulted when no explicit log directory is configured.
pub const LOG_DIR_ENV: &str = "POSTLENS_LOG_DIR";

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parse a user-facing format name; anything other than `json` is text.
    pub fn from_name(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Logical name of the component (used for defaults and file names).
    pub app_name: &'static str,
    /// Optional explicit directory for log output. If `None`, we consult
    /// `POSTLENS_LOG_DIR` and finally fall back to `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Whether to duplicate events to `stderr` in addition to the file sink.
    pub emit_stderr: bool,
    /// Preferred log encoding.
    pub format: LogFormat,
    /// Default filter applied when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "postlens",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Initialise the global `tracing` subscriber.
///
/// Returns the concrete log file path for the current day.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let resolved_dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&resolved_dir)
        .with_context(|| format!("failed to create log directory: {}", resolved_dir.display()))?;

    let log_filename = format!("{}.log", config.app_name);
    let today = Local::now().format("%Y-%m-%d").to_string();
    let full_path = resolved_dir.join(format!("{log_filename}.{today}"));

    let appender = rolling::daily(&resolved_dir, &log_filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    layers.push(match config.format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    });
    if config.emit_stderr {
        layers.push(match config.format {
            LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
            LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        });
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_PATH.set(full_path.clone());
    Ok(full_path)
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_home(dir);
    }

    if let Ok(env_dir) = std::env::var(LOG_DIR_ENV) {
        return expand_home(Path::new(&env_dir));
    }

    default_data_dir(app_name)
}

fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

fn default_data_dir(app_name: &str) -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(app_name),
        Err(_) => PathBuf::from(".").join(app_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serial_test::serial;

    #[test]
    #[serial]
    fn explicit_dir_wins_over_environment() {
        let tmp = tempfile::tempdir().unwrap();
        temp_env::with_var(LOG_DIR_ENV, Some("/var/log/elsewhere"), || {
            let resolved = resolve_log_dir("postlens", Some(tmp.path()));
            assert_eq!(resolved, tmp.path());
        });
    }

    #[test]
    #[serial]
    fn environment_dir_is_used_without_explicit_dir() {
        temp_env::with_var(LOG_DIR_ENV, Some("/var/log/elsewhere"), || {
            assert_eq!(
                resolve_log_dir("postlens", None),
                PathBuf::from("/var/log/elsewhere")
            );
        });
        temp_env::with_vars(
            [(LOG_DIR_ENV, None::<&str>), ("HOME", Some("/home/alice"))],
            || {
                assert_eq!(
                    resolve_log_dir("postlens", None),
                    PathBuf::from("/home/alice/.local/share/postlens")
                );
            },
        );
    }

    #[test]
    fn absolute_paths_are_left_alone() {
        assert_eq!(
            expand_home(Path::new("/var/log/postlens")),
            PathBuf::from("/var/log/postlens")
        );
    }

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(LogFormat::from_name(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::from_name("text"), LogFormat::Text);
        assert_eq!(LogFormat::from_name("pretty"), LogFormat::Text);
    }
}
