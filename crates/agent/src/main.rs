#![forbid(unsafe_code)]

//! gamebot: keeps a single game account's rewards, fuel and shields topped up.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use gamebot_agent::config::AgentConfig;
use gamebot_agent::credentials::InitData;
use gamebot_agent::http::HttpGameClient;
use gamebot_agent::{logging, shutdown};
use gamebot_agent::status::Status;
use gamebot_agent::supervisor::{StopReason, Supervisor};
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(name = "gamebot", version, about = "Automates periodic actions on a game account")]
struct Args {
    /// Game API base URL, e.g. https://game.example.com
    #[arg(long, env = "APP_HOST")]
    app_host: String,

    /// File holding the URL-encoded Telegram init data.
    #[arg(long, env = "GAMEBOT_USER_DATA", default_value = "user.txt")]
    user_data: PathBuf,

    /// Sleep between cycles, in seconds.
    #[arg(long, env = "GAMEBOT_CYCLE_SECS", default_value_t = 300)]
    cycle_secs: u64,

    /// Pause after each successful action, in seconds.
    #[arg(long, env = "GAMEBOT_ACTION_DELAY_SECS", default_value_t = 10)]
    action_delay_secs: u64,

    /// Upper bound for any single remote call, in seconds.
    #[arg(long, env = "GAMEBOT_CALL_TIMEOUT_SECS", default_value_t = 30)]
    call_timeout_secs: u64,

    /// HTTP request timeout, in seconds.
    #[arg(long, env = "GAMEBOT_HTTP_TIMEOUT_SECS", default_value_t = 10)]
    http_timeout_secs: u64,

    /// Retry delays after a failed cycle, in seconds (comma separated).
    #[arg(
        long,
        env = "GAMEBOT_RETRY_DELAYS",
        value_delimiter = ',',
        default_values_t = [5u64, 10, 30, 60]
    )]
    retry_delays: Vec<u64>,

    /// Run a single cycle then exit (useful for scripts).
    #[arg(long)]
    once: bool,

    /// Log level (env-filter syntax).
    #[arg(long, env = "GAMEBOT_LOG", default_value = "info")]
    log: String,

    /// Directory for `gamebot.log` and `gamebot_api.log`.
    #[arg(long, env = "GAMEBOT_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,
}

impl Args {
    fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            base_url: self.app_host.trim_end_matches('/').to_string(),
            cycle_interval: Duration::from_secs(self.cycle_secs),
            action_delay: Duration::from_secs(self.action_delay_secs),
            call_timeout: Duration::from_secs(self.call_timeout_secs),
            http_timeout: Duration::from_secs(self.http_timeout_secs),
            retry_delays: self.retry_delays.iter().copied().map(Duration::from_secs).collect(),
            max_cycles: self.once.then_some(1),
        }
    }
}

fn exit_code(reason: &StopReason) -> ExitCode {
    match reason {
        StopReason::CycleLimit => ExitCode::SUCCESS,
        StopReason::RetriesExhausted(_) => ExitCode::from(2),
        StopReason::InitFailed(_) => ExitCode::from(3),
        StopReason::Maintenance => ExitCode::from(4),
    }
}

/// Log each distinct status line until the supervisor drops the board.
fn spawn_status_watcher(mut rx: watch::Receiver<Status>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = String::new();
        while rx.changed().await.is_ok() {
            let status = rx.borrow_and_update().clone();
            if let Some(left) = status.retry_in {
                tracing::debug!(target: "gamebot::status", retry_in_secs = left.as_secs(), "countdown");
            }
            if status.retry_in.is_none() && status.message != last {
                tracing::info!(target: "gamebot::status", phase = ?status.phase, "{}", status.message);
                last = status.message;
            }
        }
    })
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = args.agent_config();
    let init_data = InitData::load(&args.user_data)?;
    let client = HttpGameClient::connect(&config.base_url, &init_data, config.http_timeout)
        .await
        .context("connect to game api")?;

    let supervisor = Supervisor::new(client, config);
    let watcher = spawn_status_watcher(supervisor.subscribe());

    let report = tokio::select! {
        report = supervisor.run() => report,
        _ = shutdown::ctrl_c() => return Ok(ExitCode::SUCCESS),
    };
    let _ = watcher.await;

    println!("{}", report.status);
    tracing::info!(
        state = ?report.final_state,
        reason = ?report.reason,
        cycles = report.cycles_completed,
        "gamebot stopped"
    );
    Ok(exit_code(&report.reason))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let _guards = match logging::init(&args.log, &args.log_dir) {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("gamebot: logging setup failed: {e:#}");
            return ExitCode::from(3);
        }
    };

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "startup failed");
            ExitCode::from(3)
        }
    }
}
