/*!
    Low-latency UDP video stream viewer core.

    `castview` receives a live MPEG-TS multiplexed video elementary stream
    over UDP, decodes it frame by frame with low-delay semantics, converts
    each frame to packed alpha-first ARGB, and publishes frames through a
    single-slot "latest frame wins" register for a UI to poll. It tolerates
    datagram loss, stream absence and per-frame decode errors — the pipeline
    degrades, it does not crash.

    # Example

    ```ignore
    use castview::{DEFAULT_PORT, Pipeline};

    let pipeline = Pipeline::new();
    pipeline.start(DEFAULT_PORT);

    // On the render path:
    if let Some(frame) = pipeline.current_frame() {
        draw_argb(&frame.data, frame.width, frame.height, frame.stride);
    }

    // Fatal errors arrive asynchronously, at most once per session:
    if let Ok(error) = pipeline.errors().try_recv() {
        show_message(error.kind(), &error.to_string());
        // A fresh start() clears the error state.
    }

    pipeline.stop();
    ```

    # Architecture

    One dedicated worker thread per session runs the whole
    receive → demux → decode → convert → publish chain:

    - [`media_source`] binds the UDP listener, demuxes the container and
      selects the video elementary stream,
    - [`media_decode`] owns the low-delay codec session,
    - [`media_transform`] converts decoded frames to the display format,
    - [`FrameSlot`] hands the freshest frame to the consumer without
      queueing or back-pressure.

    `start`, `stop` and `current_frame` are callable from any thread,
    including a UI thread, without blocking on the worker. Stopping is
    cooperative: the worker notices the request at its next loop iteration
    or retry point, releases its native resources in reverse construction
    order, and drives the state back to [`PipelineState::Idle`].
*/

mod controller;
mod publisher;
mod worker;

pub use controller::{DEFAULT_PORT, Pipeline};
pub use publisher::FrameSlot;

pub use media_source::init;
pub use media_types::{
    CodecId, DisplayFrame, Error, ErrorKind, PipelineState, PixelFormat, Result, StreamSession,
};
