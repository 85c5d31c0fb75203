//! Tracing setup: stdout, a rolling `gamebot.log`, and `gamebot_api.log`
//! holding only raw API traffic (target `gamebot::api`).

use std::path::Path;

use anyhow::Context;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Target used for request/response bodies.
pub const API_TARGET: &str = "gamebot::api";

const KEEP_FILES: usize = 5;

fn api_filter() -> Targets {
    Targets::new().with_target(API_TARGET, Level::DEBUG)
}

fn appender(dir: &Path, prefix: &str) -> anyhow::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(KEEP_FILES)
        .build(dir)
        .with_context(|| format!("open {prefix} log in {}", dir.display()))
}

/// Install the global subscriber. `filter` uses env-filter syntax and applies
/// to stdout and the main log file.
///
/// The returned guards flush the file writers on drop; keep them alive for
/// the life of the process.
pub fn init(filter: &str, log_dir: &Path) -> anyhow::Result<Vec<WorkerGuard>> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("create log dir {}", log_dir.display()))?;

    let (main_writer, main_guard) = tracing_appender::non_blocking(appender(log_dir, "gamebot")?);
    let (api_writer, api_guard) = tracing_appender::non_blocking(appender(log_dir, "gamebot_api")?);

    let main_layer = fmt::layer()
        .with_writer(main_writer)
        .with_ansi(false)
        .with_filter(EnvFilter::new(filter));
    let api_layer = fmt::layer()
        .with_writer(api_writer)
        .with_ansi(false)
        .with_filter(api_filter());

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(EnvFilter::new(filter)))
        .with(main_layer)
        .with(api_layer)
        .try_init()
        .context("install tracing subscriber")?;

    Ok(vec![main_guard, api_guard])
}
