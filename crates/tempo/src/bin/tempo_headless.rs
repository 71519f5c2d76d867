//! # Tempo Headless
//!
//! Runs a heartbeat listener for a fixed time, then shuts down cleanly.
//!
//! ```bash
//! # Defaults: 60 updates per second for 3 seconds
//! cargo run -p tempo --features cli --bin tempo_headless
//!
//! # With a config file, for 10 seconds
//! RUST_LOG=debug tempo_headless tempo.toml 10
//! ```
//!
//! The listener counts how many times the binary has run in its settings,
//! so consecutive runs show persistence working.

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use tempo::{AppConfig, ApplicationListener, Context, HeadlessApplication, ListenerError};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_RUN: Duration = Duration::from_secs(3);

/// Logs once per second of frames and tracks run count in settings.
#[derive(Default)]
struct Heartbeat {
    updates: u64,
}

impl ApplicationListener for Heartbeat {
    fn init(&mut self, ctx: &Context) -> Result<(), ListenerError> {
        if let Err(err) = ctx.settings.load() {
            tracing::warn!(error = %err, "starting with empty settings");
        }
        let runs = ctx.settings.get_int("runs", 0) + 1;
        ctx.settings.put("runs", runs);
        info!(runs, app_type = ?ctx.app.app_type(), "heartbeat started");
        Ok(())
    }

    fn update(&mut self, ctx: &Context) -> Result<(), ListenerError> {
        self.updates += 1;
        if self.updates % 60 == 0 {
            info!(
                frame = ctx.graphics.frame_id(),
                fps = ctx.graphics.frames_per_second(),
                elapsed_ms = ctx.graphics.elapsed().as_millis() as u64,
                "heartbeat"
            );
        }
        Ok(())
    }

    fn dispose(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
        info!(updates = self.updates, "heartbeat stopped");
        Ok(())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Seconds to run for. `None` for text that is not a number, negative
/// values, and values too large for a [`Duration`].
fn parse_run_duration(raw: &str) -> Option<Duration> {
    let secs = raw.trim().parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

fn main() -> ExitCode {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match AppConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(error = %err, path = %path, "bad config");
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };
    let run_for = match args.next() {
        None => DEFAULT_RUN,
        Some(raw) => match parse_run_duration(&raw) {
            Some(run_for) => run_for,
            None => {
                error!(value = %raw, "run duration must be a non-negative number of seconds");
                return ExitCode::FAILURE;
            }
        },
    };

    let app = match HeadlessApplication::with_config(
        vec![Box::new(Heartbeat::default())],
        config,
        None,
    ) {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    thread::sleep(run_for);
    app.handle().exit();

    match app.join() {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                sleeps = summary.sleeps,
                overruns = summary.overruns,
                tasks = summary.tasks,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "loop failed");
            ExitCode::FAILURE
        }
    }
}
