#![forbid(unsafe_code)]

//! `minigame-kiosk` — exhibition launcher binary.
//!
//! Refreshes the game assets, loads the catalog, then runs the terminal
//! front-end until the window is closed or the watchdog reclaims the
//! station. Pair it with `minigame-kiosk-keeper` so a fresh launcher comes
//! back up after every reclaim.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use minigame_kiosk::catalog::watcher::{self, CatalogWatcher};
use minigame_kiosk::catalog::GameCatalog;
use minigame_kiosk::frontend::console::{parse_input, ConsoleFrontend};
use minigame_kiosk::frontend::Frontend;
use minigame_kiosk::navigation::NavigationController;
use minigame_kiosk::orchestrator::supervisor::{ReclaimHook, SessionSupervisor, SupervisorSettings};
use minigame_kiosk::orchestrator::watchdog::Thresholds;
use minigame_kiosk::sync::AssetSync;
use minigame_kiosk::{AppError, KioskConfig, Result};

/// How long runtime shutdown waits for blocking tasks.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "minigame-kiosk", about = "Exhibition minigame launcher", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the games directory.
    #[arg(long)]
    games_dir: Option<PathBuf>,

    /// Skip the asset refresh at startup.
    #[arg(long)]
    no_sync: bool,

    /// Print the catalog as JSON and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("minigame-kiosk bootstrap");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?;
    let result = runtime.block_on(run(args));

    // The stdin reader sits on a blocking thread that never returns on its own.
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    result
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match &args.config {
        Some(path) => KioskConfig::load_from_path(path)?,
        None => KioskConfig::default(),
    };
    if let Some(dir) = args.games_dir {
        config.games_dir = dir;
    }
    if args.no_sync || args.list {
        config.sync.enabled = false;
    }
    info!("configuration loaded");

    // ── Refresh assets (best effort) ────────────────────
    let outcome = AssetSync::new(&config.sync, &config.assets_dir).run().await;
    debug!(?outcome, "asset sync finished");

    // ── Load catalog; failures abort startup ────────────
    let catalog = GameCatalog::load(&config.games_dir)?;

    if args.list {
        let json = serde_json::to_string_pretty(catalog.games())
            .map_err(|err| AppError::Io(format!("failed to encode catalog: {err}")))?;
        println!("{json}");
        return Ok(());
    }

    // ── Build the session stack ─────────────────────────
    let window = CancellationToken::new();
    let frontend = Arc::new(ConsoleFrontend::new(config.messages.clone(), window.clone()));

    let reclaim_frontend = Arc::clone(&frontend);
    let on_reclaim: ReclaimHook = Arc::new(move || reclaim_frontend.close());

    let settings = SupervisorSettings {
        thresholds: Thresholds {
            warning_after: config.warning_after(),
            kill_after: config.kill_after(),
            poll_interval: config.poll_interval(),
        },
        force_kill_after: config.force_kill_after(),
        reset_watchdog_on_launch: config.watchdog.reset_on_launch,
    };
    let supervisor = Arc::new(SessionSupervisor::new(
        settings,
        frontend.clone(),
        on_reclaim,
    ));
    let mut nav = NavigationController::new(catalog, Arc::clone(&supervisor), frontend.clone())?;

    // ── Catalog hot-reload ──────────────────────────────
    let (_watcher, mut reloads) = if config.watch_catalog {
        match CatalogWatcher::start(&config.games_dir) {
            Ok((watcher, rx)) => (Some(watcher), Some(rx)),
            Err(err) => {
                warn!(%err, "catalog hot-reload unavailable");
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    nav.render();
    info!(games = nav.catalog().len(), "kiosk ready");

    // ── Control loop ────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = window.cancelled() => {
                info!("window closed");
                break;
            }
            () = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Some(event) = parse_input(&line) {
                        nav.handle(event).await?;
                    } else {
                        debug!(input = line.trim(), "unrecognised input");
                        nav.render();
                    }
                }
                Ok(None) => {
                    info!("input closed");
                    break;
                }
                Err(err) => {
                    error!(%err, "failed to read input");
                    break;
                }
            },
            requested = next_reload(&mut reloads) => {
                if !requested {
                    reloads = None;
                    continue;
                }
                if let Some(fresh) = watcher::reload(&config.games_dir) {
                    if let Err(err) = nav.replace_catalog(fresh) {
                        warn!(%err, "reloaded catalog rejected");
                    }
                }
            }
        }
    }

    if !nav.is_closed() {
        nav.close().await;
    }
    info!("minigame-kiosk shut down");
    Ok(())
}

/// Next catalog reload request, or never when hot-reload is off.
async fn next_reload(rx: &mut Option<mpsc::Receiver<()>>) -> bool {
    match rx {
        Some(rx) => watcher::next_request(rx).await,
        None => std::future::pending().await,
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
