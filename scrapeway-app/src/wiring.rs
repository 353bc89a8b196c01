use scrapeway_common::observability::{LogConfig, LogFormat};
use scrapeway_config::{LogFormatKind, LoggingConfig, ScrapewayConfig};
use scrapeway_drivers::browser::{LaunchOptions, WebDriverLauncher};
use scrapeway_web::Orchestrator;
use std::path::PathBuf;
use std::sync::Arc;

pub fn log_config(cfg: &LoggingConfig) -> LogConfig {
    LogConfig {
        log_dir: cfg.dir.as_ref().map(PathBuf::from),
        emit_stderr: cfg.stderr,
        format: match cfg.format {
            LogFormatKind::Text => LogFormat::Text,
            LogFormatKind::Json => LogFormat::Json,
        },
        default_filter: cfg.filter.clone(),
        ..LogConfig::default()
    }
}

pub fn launch_options(cfg: &ScrapewayConfig) -> LaunchOptions {
    LaunchOptions {
        webdriver_url: cfg.browser.webdriver_url.clone(),
        headless: cfg.browser.headless,
        proxy_url: cfg.proxy.url(),
        user_agent: cfg.browser.user_agent.clone(),
        window_size: cfg.browser.window_size,
    }
}

pub fn build_orchestrator(cfg: &ScrapewayConfig) -> Orchestrator {
    let launcher = WebDriverLauncher::new(launch_options(cfg));
    Orchestrator::from_config(Arc::new(launcher), cfg)
}
