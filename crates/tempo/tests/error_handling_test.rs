//! # Error Handling Tests
//!
//! Failures on the loop thread reach the exception handler and skip the
//! shutdown pass.
//!
//! Run with: cargo test -p tempo --test error_handling_test

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use tempo::{
    AppConfig, AppError, ApplicationListener, Context, ExceptionHandler, HeadlessApplication,
    ListenerError, Phase,
};

#[derive(Clone, Copy)]
enum Failure {
    Error,
    Panic,
}

/// Fails on the given update and flags whether dispose ever ran.
struct Faulty {
    fail_on: u64,
    failure: Failure,
    updates: u64,
    disposed: Arc<AtomicBool>,
}

impl Faulty {
    fn new(fail_on: u64, failure: Failure, disposed: &Arc<AtomicBool>) -> Self {
        Self {
            fail_on,
            failure,
            updates: 0,
            disposed: Arc::clone(disposed),
        }
    }
}

impl ApplicationListener for Faulty {
    fn update(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
        self.updates += 1;
        if self.updates == self.fail_on {
            match self.failure {
                Failure::Error => return Err(format!("bad frame {}", self.updates).into()),
                Failure::Panic => panic!("kaboom"),
            }
        }
        Ok(())
    }

    fn dispose(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
        self.disposed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn capturing_handler() -> (ExceptionHandler, Receiver<AppError>) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let handler: ExceptionHandler = Box::new(move |err: AppError| {
        let _ = tx.send(err);
    });
    (handler, rx)
}

fn uncapped() -> AppConfig {
    AppConfig::default().with_render_interval(0.0)
}

#[test]
fn test_listener_error_reaches_handler() {
    let disposed = Arc::new(AtomicBool::new(false));
    let (handler, errors) = capturing_handler();
    let app = HeadlessApplication::with_config(
        vec![Box::new(Faulty::new(3, Failure::Error, &disposed))],
        uncapped(),
        Some(handler),
    )
    .unwrap();

    let err = errors.recv_timeout(Duration::from_secs(5)).unwrap();
    match err {
        AppError::Listener { phase, source } => {
            assert_eq!(phase, Phase::Update);
            assert_eq!(source.to_string(), "bad frame 3");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(matches!(app.join(), Err(AppError::LoopAborted)));
    assert!(!disposed.load(Ordering::SeqCst));
}

#[test]
fn test_listener_panic_reaches_handler() {
    let disposed = Arc::new(AtomicBool::new(false));
    let (handler, errors) = capturing_handler();
    let app = HeadlessApplication::with_config(
        vec![Box::new(Faulty::new(1, Failure::Panic, &disposed))],
        uncapped(),
        Some(handler),
    )
    .unwrap();

    let err = errors.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(
        matches!(&err, AppError::Panicked { phase: Phase::Update, message } if message == "kaboom"),
        "{err}"
    );
    assert!(app.wait_timeout(Duration::from_secs(5)));
    assert!(!disposed.load(Ordering::SeqCst));
}

#[test]
fn test_init_error_skips_updates() {
    struct BadInit;
    impl ApplicationListener for BadInit {
        fn init(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
            Err("missing asset".into())
        }

        fn update(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
            panic!("update after failed init");
        }
    }

    let (handler, errors) = capturing_handler();
    let app =
        HeadlessApplication::with_config(vec![Box::new(BadInit)], uncapped(), Some(handler)).unwrap();

    let err = errors.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(err, AppError::Listener { phase: Phase::Init, .. }));
    assert!(matches!(app.join(), Err(AppError::LoopAborted)));
}

#[test]
fn test_panicking_task_reaches_handler() {
    struct Idle;
    impl ApplicationListener for Idle {}

    let (handler, errors) = capturing_handler();
    let app =
        HeadlessApplication::with_config(vec![Box::new(Idle)], uncapped(), Some(handler)).unwrap();
    app.handle().post(|| panic!("task blew up"));

    let err = errors.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(&err, AppError::LoopPanicked(message) if message == "task blew up"));
    assert!(matches!(app.join(), Err(AppError::LoopAborted)));
}

#[test]
fn test_default_handler_panics_loop_thread() {
    let disposed = Arc::new(AtomicBool::new(false));
    let app = HeadlessApplication::with_config(
        vec![Box::new(Faulty::new(2, Failure::Error, &disposed))],
        uncapped(),
        None,
    )
    .unwrap();

    match app.join() {
        Err(AppError::LoopPanicked(message)) => assert!(message.contains("bad frame 2"), "{message}"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_construction_errors() {
    assert!(matches!(
        HeadlessApplication::with_config(Vec::new(), AppConfig::default(), None),
        Err(AppError::NoListeners)
    ));

    struct Idle;
    impl ApplicationListener for Idle {}

    let bad = AppConfig::default().with_render_interval(f32::NAN);
    assert!(matches!(
        HeadlessApplication::with_config(vec![Box::new(Idle)], bad, None),
        Err(AppError::Config(_))
    ));
}

#[test]
fn test_listeners_are_dropped_after_abort() {
    struct Failing {
        handle: Option<tempo::AppHandle>,
        dropped: Arc<AtomicBool>,
    }

    impl ApplicationListener for Failing {
        fn init(&mut self, ctx: &Context) -> Result<(), ListenerError> {
            self.handle = Some(ctx.app.clone());
            Ok(())
        }

        fn update(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
            if let Some(handle) = &self.handle {
                handle.post(|| {});
            }
            Err("worker died".into())
        }
    }

    impl Drop for Failing {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    let dropped = Arc::new(AtomicBool::new(false));
    let (handler, errors) = capturing_handler();
    let app = HeadlessApplication::with_config(
        vec![Box::new(Failing {
            handle: None,
            dropped: Arc::clone(&dropped),
        })],
        uncapped(),
        Some(handler),
    )
    .unwrap();

    assert!(matches!(
        errors.recv_timeout(Duration::from_secs(5)).unwrap(),
        AppError::Listener { phase: Phase::Update, .. }
    ));
    assert!(matches!(app.join(), Err(AppError::LoopAborted)));
    assert!(dropped.load(Ordering::SeqCst));
}
