//! Lifecycle tests that exercise the pipeline against a real UDP socket but
//! without any producer on the wire.

use std::time::{Duration, Instant};

use castview::{ErrorKind, Pipeline, PipelineState};

fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    cond()
}

#[test]
fn running_without_producer_publishes_nothing() {
    init_test_logging();
    let pipeline = Pipeline::new();
    pipeline.start(40111);

    assert!(
        wait_until(Duration::from_secs(5), || pipeline.is_running()),
        "pipeline never reached Running, state: {:?}",
        pipeline.state()
    );

    // No producer: after a couple of seconds the pipeline must still be
    // running quietly, with no frames and no error.
    std::thread::sleep(Duration::from_secs(2));
    assert!(pipeline.is_running());
    assert!(pipeline.current_frame().is_none());
    assert!(pipeline.errors().try_recv().is_err());

    pipeline.stop();
    assert!(
        wait_until(Duration::from_secs(2), || {
            pipeline.state() == PipelineState::Idle
        }),
        "pipeline never unwound to Idle, state: {:?}",
        pipeline.state()
    );
}

#[test]
fn stop_while_awaiting_data_reaches_idle_promptly() {
    init_test_logging();
    let pipeline = Pipeline::new();
    pipeline.start(40112);

    assert!(wait_until(Duration::from_secs(5), || pipeline.is_running()));

    let stopped_at = Instant::now();
    pipeline.stop();
    assert!(
        wait_until(Duration::from_secs(1), || {
            pipeline.state() == PipelineState::Idle
        }),
        "stop took longer than one retry interval, state: {:?}",
        pipeline.state()
    );
    assert!(stopped_at.elapsed() < Duration::from_secs(1));
    assert!(pipeline.errors().try_recv().is_err());
    assert!(pipeline.current_frame().is_none());
}

#[test]
fn start_is_idempotent_while_active() {
    init_test_logging();
    let pipeline = Pipeline::new();
    pipeline.start(40113);
    // A second worker would lose the bind race against the first and surface
    // a spurious error; idempotent start must not spawn one.
    pipeline.start(40113);
    pipeline.start(40113);

    assert!(wait_until(Duration::from_secs(5), || pipeline.is_running()));
    std::thread::sleep(Duration::from_millis(500));
    assert!(pipeline.errors().try_recv().is_err());

    pipeline.stop();
    assert!(wait_until(Duration::from_secs(2), || {
        pipeline.state() == PipelineState::Idle
    }));
}

#[test]
fn stop_is_idempotent() {
    init_test_logging();
    let pipeline = Pipeline::new();

    // Safe before any start.
    pipeline.stop();
    assert_eq!(pipeline.state(), PipelineState::Idle);

    pipeline.start(40114);
    assert!(wait_until(Duration::from_secs(5), || pipeline.is_running()));

    pipeline.stop();
    pipeline.stop();
    assert!(wait_until(Duration::from_secs(2), || {
        pipeline.state() == PipelineState::Idle
    }));

    // And again after reaching Idle.
    pipeline.stop();
    assert_eq!(pipeline.state(), PipelineState::Idle);
}

#[test]
fn occupied_port_fails_construction_exactly_once() {
    init_test_logging();
    let blocker = std::net::UdpSocket::bind("0.0.0.0:40115").expect("bind blocker");

    let pipeline = Pipeline::new();
    pipeline.start(40115);

    let error = pipeline
        .errors()
        .recv_timeout(Duration::from_secs(5))
        .expect("construction failure must surface");
    assert_eq!(error.kind(), ErrorKind::OpenFailed);
    assert!(error.code().is_some(), "bind failure carries an errno");

    assert!(wait_until(Duration::from_secs(2), || {
        pipeline.state() == PipelineState::Error
    }));
    assert!(pipeline.current_frame().is_none(), "no frames were published");
    assert!(
        pipeline.errors().try_recv().is_err(),
        "the error fires exactly once"
    );

    // stop() in the error state is a no-op; the error is cleared by the
    // next start.
    pipeline.stop();
    assert_eq!(pipeline.state(), PipelineState::Error);

    drop(blocker);
    pipeline.start(40115);
    assert!(
        wait_until(Duration::from_secs(5), || pipeline.is_running()),
        "restart after error never reached Running, state: {:?}",
        pipeline.state()
    );

    pipeline.stop();
    assert!(wait_until(Duration::from_secs(2), || {
        pipeline.state() == PipelineState::Idle
    }));
}

#[test]
fn drop_while_running_joins_the_worker() {
    init_test_logging();
    let pipeline = Pipeline::new();
    pipeline.start(40116);
    assert!(wait_until(Duration::from_secs(5), || pipeline.is_running()));
    drop(pipeline);
    // Dropping must not hang or leak the port: a fresh bind succeeds.
    let rebind = std::net::UdpSocket::bind("0.0.0.0:40116");
    assert!(rebind.is_ok(), "worker still holds the port after drop");
}
