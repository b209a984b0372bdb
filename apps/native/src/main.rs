//! Serial port monitor
//!
//! Polls the OS port list and logs each device as it appears (and gets
//! connected) or disappears. Stops on Ctrl-C.
//!
//! Usage: `port-monitor [config.json]`, log level via `RUST_LOG`.

mod config;

use config::MonitorConfig;
use connectors::{log_connection_events, SerialWatchdog};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match MonitorConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Unable to load configuration");
            std::process::exit(2);
        }
    };

    match transport_native::port_summary() {
        Ok(summary) => {
            for line in summary.lines() {
                tracing::info!("{}", line);
            }
        }
        Err(e) => tracing::warn!(error = %e, "Unable to list serial ports"),
    }

    tracing::info!(
        interval_ms = config.poll_interval().as_millis() as u64,
        baud = config.profile.baud_rate,
        framing = %config.profile.framing(),
        "Watching serial ports"
    );

    let mut watchdog = SerialWatchdog::serial(config.profile.clone());
    watchdog.subscribe(log_connection_events);

    let mut ticker = tokio::time::interval(config.poll_interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut exit_code = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => match watchdog.poll() {
                Ok(report) => {
                    if !report.failed.is_empty() {
                        let count = report.failed.len();
                        tracing::debug!(count, "Devices present but not connected");
                    }
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(error = %e, "Stopping: connector factory is misconfigured");
                    exit_code = 1;
                    break;
                }
                Err(e) => tracing::warn!(error = %e, "Poll failed"),
            },
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Unable to listen for Ctrl-C");
                }
                break;
            }
        }
    }

    tracing::info!(devices = watchdog.known_count(), "Shutting down");
    drop(watchdog);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
