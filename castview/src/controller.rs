/*!
    Pipeline lifecycle control.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use media_types::{DisplayFrame, Error, PipelineState};

use crate::publisher::FrameSlot;
use crate::worker;

/**
    Default UDP port producers stream to.
*/
pub const DEFAULT_PORT: u16 = media_source::DEFAULT_PORT;

/**
    State shared between the controller and its worker thread.
*/
pub(crate) struct Shared {
    state: Mutex<PipelineState>,
    cancel: AtomicBool,
    slot: FrameSlot,
    errors: Sender<Error>,
}

impl Shared {
    /**
        True once a stop has been requested.
    */
    pub(crate) fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub(crate) fn state(&self) -> PipelineState {
        *self.state.lock()
    }

    /**
        Starting → Running. A no-op once a stop has raced in.
    */
    pub(crate) fn enter_running(&self) {
        let mut state = self.state.lock();
        if *state == PipelineState::Starting {
            *state = PipelineState::Running;
        }
    }

    pub(crate) fn publish(&self, frame: DisplayFrame) {
        self.slot.publish(frame);
    }

    /**
        Final state transition of a worker. Called only after the session's
        native resources have been released.

        A fatal result surfaces on the error channel exactly once; if a stop
        request raced the failure, the stop wins and the pipeline simply goes
        idle.
    */
    pub(crate) fn finish(&self, result: Result<(), Error>) {
        let mut state = self.state.lock();
        let stopping = *state == PipelineState::Stopping || self.cancelled();
        match result {
            Err(error) if !stopping => {
                *state = PipelineState::Error;
                drop(state);
                let _ = self.errors.send(error);
            }
            _ => *state = PipelineState::Idle,
        }
    }
}

/**
    The receive pipeline: the one component a host embeds.

    Spawns a single dedicated worker thread per session that builds the
    input → decode → convert chain and publishes converted frames into a
    single-slot register. All entry points are callable from any thread,
    including a UI thread, without blocking on the worker.

    Fatal session errors surface asynchronously on [`errors`], at most once
    per session; the pipeline is restartable with a fresh [`start`] after an
    error.

    [`errors`]: Self::errors
    [`start`]: Self::start
*/
pub struct Pipeline {
    shared: Arc<Shared>,
    errors: Receiver<Error>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Pipeline {
    /**
        Create an idle pipeline.
    */
    pub fn new() -> Self {
        let (errors_tx, errors_rx) = unbounded();
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PipelineState::Idle),
                cancel: AtomicBool::new(false),
                slot: FrameSlot::new(),
                errors: errors_tx,
            }),
            errors: errors_rx,
            worker: Mutex::new(None),
        }
    }

    /**
        Start receiving on the given UDP port.

        Returns immediately; construction happens on the worker and errors
        from this point surface on [`errors`]. A no-op while a session is
        starting, running or stopping. Calling `start` after an error clears
        the error state and begins a fresh session.

        [`errors`]: Self::errors
    */
    pub fn start(&self, port: u16) {
        {
            let mut state = self.shared.state.lock();
            if state.is_active() {
                return;
            }
            // Reset the flag under the state lock so a concurrent stop()
            // cannot be wiped out after it marked the pipeline Stopping.
            self.shared.cancel.store(false, Ordering::Relaxed);
            *state = PipelineState::Starting;
        }

        // The previous worker, if any, already made its final state
        // transition, so this join cannot block for long.
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }

        self.shared.slot.clear();

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name("castview-pipeline".into())
            .spawn(move || worker::run(&shared, port));
        match spawned {
            Ok(handle) => *self.worker.lock() = Some(handle),
            Err(e) => self.shared.finish(Err(Error::alloc_failed(format!(
                "failed to spawn pipeline worker: {e}"
            )))),
        }
    }

    /**
        Request a stop.

        Sets the cooperative cancellation flag and returns without waiting
        for teardown; the worker unwinds and drives the state to
        [`PipelineState::Idle`]. Idempotent, and a no-op when idle or in the
        error state (an error is cleared by the next [`start`]).

        [`start`]: Self::start
    */
    pub fn stop(&self) {
        let mut state = self.shared.state.lock();
        match *state {
            PipelineState::Starting | PipelineState::Running => {
                *state = PipelineState::Stopping;
                self.shared.cancel.store(true, Ordering::Relaxed);
            }
            PipelineState::Stopping | PipelineState::Idle | PipelineState::Error => {}
        }
    }

    /**
        The most recently published frame, if any.

        Non-blocking; safe to call from the render path. "No stream yet" and
        "stream currently unavailable" both simply mean no frame yet.
    */
    pub fn current_frame(&self) -> Option<Arc<DisplayFrame>> {
        self.shared.slot.latest()
    }

    /**
        The current lifecycle state.
    */
    pub fn state(&self) -> PipelineState {
        self.shared.state()
    }

    /**
        True while the session is live.
    */
    pub fn is_running(&self) -> bool {
        self.state() == PipelineState::Running
    }

    /**
        Fatal session errors, at most one per session.
    */
    pub fn errors(&self) -> &Receiver<Error> {
        &self.errors
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pipeline_is_idle() {
        let pipeline = Pipeline::new();
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(!pipeline.is_running());
        assert!(pipeline.current_frame().is_none());
        assert!(pipeline.errors().try_recv().is_err());
    }

    #[test]
    fn stop_without_start_is_noop() {
        let pipeline = Pipeline::new();
        pipeline.stop();
        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[test]
    fn finish_prefers_stop_over_error() {
        let pipeline = Pipeline::new();
        {
            let mut state = pipeline.shared.state.lock();
            *state = PipelineState::Stopping;
        }
        pipeline
            .shared
            .finish(Err(Error::read_failed("lost the wire", None)));

        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(pipeline.errors().try_recv().is_err());
    }

    #[test]
    fn finish_surfaces_error_once() {
        let pipeline = Pipeline::new();
        {
            let mut state = pipeline.shared.state.lock();
            *state = PipelineState::Running;
        }
        pipeline
            .shared
            .finish(Err(Error::read_failed("lost the wire", None)));

        assert_eq!(pipeline.state(), PipelineState::Error);
        assert!(pipeline.errors().try_recv().is_ok());
        assert!(pipeline.errors().try_recv().is_err());
    }
}
