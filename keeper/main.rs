#![forbid(unsafe_code)]

//! `minigame-kiosk-keeper` — keeps a launcher running on the station.
//!
//! Spawns the launcher, waits for it to exit and starts it again after a
//! short delay. After a watchdog reclaim the launcher closes itself, so the
//! next attendee always finds a fresh main menu. Ctrl-C or SIGTERM stops
//! the current launcher and exits.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use clap::Parser;
use tokio::process::{Child, Command};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    name = "minigame-kiosk-keeper",
    about = "Relaunches the kiosk whenever it exits",
    version,
    long_about = None
)]
struct Cli {
    /// Launcher executable to keep alive.
    #[arg(long, default_value = default_exe())]
    exe: PathBuf,

    /// Delay before relaunching, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    restart_delay_ms: u64,

    /// Arguments passed to the launcher.
    #[arg(last = true)]
    args: Vec<String>,
}

fn default_exe() -> &'static str {
    if cfg!(windows) {
        "./minigame-kiosk.exe"
    } else {
        "./minigame-kiosk"
    }
}

/// Grace period given to the launcher on shutdown before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

fn main() {
    let args = Cli::parse();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = fmt().with_env_filter(env_filter).try_init() {
        eprintln!("failed to init tracing: {err}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to build tokio runtime: {err}");
            std::process::exit(1);
        }
    };

    runtime.block_on(keep_alive(args));
}

async fn keep_alive(args: Cli) {
    let restart_delay = Duration::from_millis(args.restart_delay_ms);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!(exe = %args.exe.display(), "keeper started");

    loop {
        let mut child = match spawn_launcher(&args) {
            Ok(child) => child,
            Err(err) => {
                error!(%err, exe = %args.exe.display(), "failed to start launcher");
                tokio::select! {
                    () = &mut shutdown => break,
                    () = tokio::time::sleep(restart_delay) => continue,
                }
            }
        };
        info!(pid = child.id().unwrap_or(0), "launcher started");

        tokio::select! {
            () = &mut shutdown => {
                info!("shutdown signal received, stopping launcher");
                stop_launcher(&mut child).await;
                break;
            }
            status = child.wait() => match status {
                Ok(status) => info!(%status, "launcher exited"),
                Err(err) => warn!(%err, "failed to wait for launcher"),
            },
        }

        tokio::select! {
            () = &mut shutdown => break,
            () = tokio::time::sleep(restart_delay) => {}
        }
    }

    info!("keeper stopped");
}

fn spawn_launcher(args: &Cli) -> std::io::Result<Child> {
    Command::new(&args.exe)
        .args(&args.args)
        .stdin(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
}

async fn stop_launcher(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) {
            if let Err(err) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
                warn!(%err, "failed to signal launcher");
            }
        }
    }

    match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
        Ok(Ok(status)) => info!(%status, "launcher stopped"),
        Ok(Err(err)) => warn!(%err, "error waiting for launcher"),
        Err(_) => {
            warn!("launcher did not exit within grace period, forcing kill");
            if let Err(err) = child.kill().await {
                warn!(%err, "failed to force-kill launcher");
            }
        }
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
