//! `tracing` setup shared by the server and the one-shot CLI.
//!
//! Both write to a daily-rolling file under the log directory and, unless
//! told otherwise, mirror events to `stderr`. [`init_logging`] installs the
//! global subscriber once; later calls return the path chosen the first time.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Env var consulted when no directory is configured.
pub const LOG_DIR_ENV: &str = "SCRAPEWAY_LOG_DIR";

static FILE_WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static ACTIVE_LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used as the log file stem and the fallback directory name.
    pub app_name: &'static str,
    /// Falls back to `$SCRAPEWAY_LOG_DIR`, then `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset, e.g. `info,scrape.serp=debug`.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "scrapeway",
            log_dir: None,
            emit_stderr: true,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Directory the rolling appender writes into.
    pub fn directory(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return expand_home(dir);
        }
        match std::env::var(LOG_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => expand_home(Path::new(&dir)),
            _ => fallback_dir(self.app_name),
        }
    }

    fn file_stem(&self) -> String {
        format!("{}.log", self.app_name)
    }

    /// Path of the file the appender is writing to today.
    pub fn todays_file(&self) -> PathBuf {
        let date = Local::now().format("%Y-%m-%d");
        self.directory().join(format!("{}.{date}", self.file_stem()))
    }
}

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

fn sink_layer<S>(format: LogFormat, writer: NonBlocking) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

fn stderr_layer<S>(format: LogFormat) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    }
}

/// Install the global subscriber and return today's log file path.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = ACTIVE_LOG_FILE.get() {
        return Ok(path.clone());
    }

    let dir = config.directory();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, config.file_stem()));
    let _ = FILE_WRITER_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))
        .with_context(|| format!("invalid log filter {:?}", config.default_filter))?;

    let mut layers = vec![sink_layer(config.format, writer)];
    if config.emit_stderr {
        layers.push(stderr_layer(config.format));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let path = config.todays_file();
    let _ = ACTIVE_LOG_FILE.set(path.clone());
    Ok(path)
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

fn fallback_dir(app_name: &str) -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local/share").join(app_name),
        None => PathBuf::from(app_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_dir_is_used_as_is() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = LogConfig {
            log_dir: Some(tmp.path().to_path_buf()),
            ..LogConfig::default()
        };
        assert_eq!(cfg.directory(), tmp.path());
        let file = cfg.todays_file();
        assert!(file.starts_with(tmp.path()));
        assert!(file
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("scrapeway.log.")));
    }

    #[test]
    fn fallback_dir_is_named_after_app() {
        assert!(fallback_dir("scrapeway").ends_with("scrapeway"));
    }

    #[test]
    fn absolute_paths_are_not_expanded() {
        let p = Path::new("/var/log/scrapeway");
        assert_eq!(expand_home(p), PathBuf::from("/var/log/scrapeway"));
    }
}
