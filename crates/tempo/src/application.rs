//! # Headless Application
//!
//! Drives listeners on a dedicated thread.
//!
//! ## Loop Thread
//!
//! ```text
//! spawn ─► init all ─┬─ pacing disabled ─────────────────────────────┐
//!                    │                                               ▼
//!                    └─► ┌──────────── while running ────────────┐  pause + dispose
//!                        │ 1. wait for frame target              │  settings autosave
//!                        │ 2. drain posted tasks                 │       │
//!                        │ 3. graphics bookkeeping               │       ▼
//!                        │ 4. pending resize, late inits         │     done
//!                        │ 5. update all                         │
//!                        └───────────────────────────────────────┘
//! ```
//!
//! Any error or panic escaping this body abandons it on the spot (no
//! shutdown pass) and goes to the exception handler. Either way the
//! registered listeners are dropped on the loop thread before it ends.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tempo_core::{FramePacer, Pacing, PacerStats, SystemClock};
use tempo_shared::AppConfig;

use crate::context::Context;
use crate::error::{panic_message, AppError, AppResult, ListenerError, Phase};
use crate::handle::AppHandle;
use crate::listener::ApplicationListener;

/// Receives the error that ended the loop. Runs on the loop thread.
pub type ExceptionHandler = Box<dyn FnOnce(AppError) + Send + 'static>;

/// What the loop did before it shut down cleanly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Frames run.
    pub frames: u64,
    /// Frames that slept before starting.
    pub sleeps: u64,
    /// Frames that started after their target.
    pub overruns: u64,
    /// Posted tasks executed.
    pub tasks: u64,
}

/// A running headless application.
///
/// Dropping it detaches the loop thread, which keeps running until an exit
/// is requested through an [`AppHandle`].
pub struct HeadlessApplication {
    handle: AppHandle,
    context: Arc<Context>,
    thread: JoinHandle<Option<LoopSummary>>,
    done: Receiver<()>,
}

impl HeadlessApplication {
    /// Starts a single listener with the default configuration. Failures on
    /// the loop thread are logged and then panic the loop thread.
    ///
    /// # Errors
    ///
    /// [`AppError::Spawn`] if the loop thread cannot be created.
    pub fn new<L>(listener: L) -> AppResult<Self>
    where
        L: ApplicationListener + 'static,
    {
        Self::with_config(vec![Box::new(listener)], AppConfig::default(), None)
    }

    /// Starts `listeners` in order with `config`.
    ///
    /// `handler` receives whatever ends the loop abnormally. Without one,
    /// the error is logged and the loop thread panics, which
    /// [`join`](Self::join) reports as [`AppError::LoopPanicked`].
    ///
    /// Returns as soon as the loop thread is spawned.
    ///
    /// # Errors
    ///
    /// [`AppError::NoListeners`], [`AppError::Config`] or [`AppError::Core`]
    /// for an unusable configuration, [`AppError::Spawn`] if the thread
    /// cannot be created.
    pub fn with_config(
        listeners: Vec<Box<dyn ApplicationListener>>,
        config: AppConfig,
        handler: Option<ExceptionHandler>,
    ) -> AppResult<Self> {
        if listeners.is_empty() {
            return Err(AppError::NoListeners);
        }
        config.validate()?;
        let pacing = Pacing::from_secs_f32(config.render_interval)?;

        let handle = AppHandle::new();
        for listener in listeners {
            handle.add_listener(listener)?;
        }
        let context = Arc::new(Context::new(handle.clone(), &config));
        let handler: ExceptionHandler = match handler {
            Some(handler) => handler,
            None => Box::new(default_handler),
        };

        let (done_tx, done) = crossbeam_channel::bounded(1);
        let loop_context = Arc::clone(&context);
        let thread = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    run_loop(&loop_context, pacing)
                }));
                release_listeners(&loop_context);
                let summary = match outcome {
                    Ok(Ok(summary)) => Some(summary),
                    Ok(Err(err)) => {
                        handler(err);
                        None
                    }
                    Err(payload) => {
                        handler(AppError::LoopPanicked(panic_message(&*payload)));
                        None
                    }
                };
                // The receiver may already be gone.
                let _ = done_tx.send(());
                summary
            })
            .map_err(AppError::Spawn)?;

        tracing::info!(
            app = %config.app_name,
            thread = %config.thread_name,
            pacing = ?pacing,
            "headless application started"
        );

        Ok(Self {
            handle,
            context,
            thread,
            done,
        })
    }

    /// A handle for posting work and requesting exit.
    #[must_use]
    pub fn handle(&self) -> AppHandle {
        self.handle.clone()
    }

    /// The environment listeners receive.
    #[must_use]
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Returns `true` once the loop thread has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits up to `timeout` for the loop thread to end.
    ///
    /// Returns `true` if it ended, including through the exception handler.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        }
    }

    /// Blocks until the loop thread ends.
    ///
    /// Does not request exit; call [`AppHandle::exit`] first or this waits
    /// forever on a running loop.
    ///
    /// # Errors
    ///
    /// [`AppError::LoopAborted`] if the exception handler took the error and
    /// returned, [`AppError::LoopPanicked`] if the loop thread panicked.
    pub fn join(self) -> AppResult<LoopSummary> {
        match self.thread.join() {
            Ok(Some(summary)) => Ok(summary),
            Ok(None) => Err(AppError::LoopAborted),
            Err(payload) => Err(AppError::LoopPanicked(panic_message(&*payload))),
        }
    }
}

impl std::fmt::Debug for HeadlessApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessApplication")
            .field("handle", &self.handle)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

fn default_handler(err: AppError) {
    tracing::error!(error = %err, "uncaught error on the loop thread");
    panic!("headless application failed: {err}");
}

/// Runs one listener callback, converting errors and panics.
fn invoke<F>(phase: Phase, callback: F) -> AppResult<()>
where
    F: FnOnce() -> Result<(), ListenerError>,
{
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(AppError::Listener { phase, source }),
        Err(payload) => Err(AppError::Panicked {
            phase,
            message: panic_message(&*payload),
        }),
    }
}

fn run_loop(ctx: &Context, pacing: Pacing) -> AppResult<LoopSummary> {
    let shared = ctx.app.shared();

    let initialized = init_pending(ctx)?;
    tracing::info!(listeners = initialized, "listeners initialised");

    let stats = match FramePacer::for_pacing(pacing, SystemClock) {
        Some(mut pacer) => {
            while shared.running.load(Ordering::Acquire) {
                pacer.wait();

                let drained = shared.queue.drain();
                if drained > 0 {
                    tracing::debug!(tasks = drained, "drained posted tasks");
                }

                ctx.graphics.begin_frame();
                apply_pending_resize(ctx)?;
                init_pending(ctx)?;

                shared
                    .registry
                    .for_each_initialized(|listener| invoke(Phase::Update, || listener.update(ctx)))?;
            }
            pacer.stats()
        }
        None => {
            tracing::debug!("pacing disabled, skipping frame loop");
            PacerStats::default()
        }
    };

    shutdown(ctx)?;

    let summary = LoopSummary {
        frames: stats.frames,
        sleeps: stats.sleeps,
        overruns: stats.overruns,
        tasks: shared.queue.executed(),
    };
    tracing::info!(
        frames = summary.frames,
        overruns = summary.overruns,
        tasks = summary.tasks,
        "headless application stopped"
    );
    Ok(summary)
}

fn init_pending(ctx: &Context) -> AppResult<usize> {
    ctx.app
        .shared()
        .registry
        .init_pending(|listener| invoke(Phase::Init, || listener.init(ctx)))
}

fn apply_pending_resize(ctx: &Context) -> AppResult<()> {
    let shared = ctx.app.shared();
    let Some((width, height)) = shared.pending_resize.lock().take() else {
        return Ok(());
    };

    tracing::debug!(width, height, "applying resize");
    ctx.graphics.set_size(width, height);
    shared.registry.for_each_initialized(|listener| {
        invoke(Phase::Resize, || listener.resize(ctx, width, height))
    })
}

/// Drops every registered listener on the loop thread, clean exit or not.
/// Listeners holding an [`AppHandle`] would otherwise keep the shared state
/// alive through the registry that owns them.
fn release_listeners(ctx: &Context) {
    let released = match ctx.app.shared().registry.clear() {
        Ok(released) => released,
        Err(err) => {
            tracing::warn!(error = %err, "listeners could not be released");
            return;
        }
    };
    let count = released.len();
    if panic::catch_unwind(AssertUnwindSafe(move || drop(released))).is_err() {
        tracing::warn!("a listener panicked while being dropped");
    }
    tracing::debug!(listeners = count, "listeners released");
}

fn shutdown(ctx: &Context) -> AppResult<()> {
    ctx.app.shared().registry.for_each_initialized(|listener| -> AppResult<()> {
        invoke(Phase::Pause, || listener.pause(ctx))?;
        invoke(Phase::Dispose, || listener.dispose(ctx))
    })?;

    if ctx.settings.autosave()? {
        tracing::debug!("settings saved at shutdown");
    }
    Ok(())
}
