/*!
    Background pipeline worker.
*/

use std::thread::sleep;
use std::time::Duration;

use media_decode::{DecoderOpen, VideoDecoder};
use media_source::{Open, ReadOutcome, SourceConfig, UdpSource};
use media_transform::ColorConverter;
use media_types::{Error, Result};

use crate::controller::Shared;

/// Delay before retrying a read that would block.
const RETRY_DELAY: Duration = Duration::from_millis(4);
/// Delay before re-probing a wire with no stream on it.
const PROBE_RETRY_DELAY: Duration = Duration::from_millis(50);

/**
    Worker entry point: runs one session from construction to teardown.
*/
pub(crate) fn run(shared: &Shared, port: u16) {
    log::debug!("pipeline worker started for udp port {port}");
    let result = run_session(shared, port);
    // run_session returns only after its native resources are dropped, so
    // the state transition below is never observable while they are alive.
    match &result {
        Ok(()) => log::debug!("pipeline worker stopped"),
        Err(e) => log::error!("pipeline session failed: {e}"),
    }
    shared.finish(result);
}

/**
    One stream session.

    Field order is load-bearing: drop order is the reverse of construction
    order (converter, then decoder, then source).
*/
struct ActiveSession {
    converter: ColorConverter,
    decoder: VideoDecoder,
    source: UdpSource,
}

fn run_session(shared: &Shared, port: u16) -> Result<()> {
    let config = SourceConfig::new(port);

    let mut session = loop {
        if shared.cancelled() {
            return Ok(());
        }
        match build_session(&config)? {
            Some(session) => break session,
            None => {
                // Nothing on the wire yet. The listener itself is fine, so
                // the pipeline counts as running while it waits for a
                // producer to appear.
                shared.enter_running();
                sleep(PROBE_RETRY_DELAY);
            }
        }
    };
    shared.enter_running();

    let stream_index = session.decoder.session().stream_index;
    loop {
        if shared.cancelled() {
            return Ok(());
        }
        match session.source.read_unit(stream_index)? {
            ReadOutcome::Unit(unit) => {
                session.decoder.submit(&unit)?;
                for frame in session.decoder.drain() {
                    let display = session.converter.convert(&frame?)?;
                    shared.publish(display);
                }
            }
            ReadOutcome::WouldBlock => sleep(RETRY_DELAY),
            ReadOutcome::EndOfStream => return Err(Error::EndOfStream),
        }
    }
}

/**
    Attempt to build a full session: listener, probe, selection, decoder,
    converter.

    `Ok(None)` means the wire has not yet revealed a usable stream — retry
    later. Any `Err` is a genuine construction failure and fatal.
*/
fn build_session(config: &SourceConfig) -> Result<Option<ActiveSession>> {
    let source = match UdpSource::open(config)? {
        Open::Ready(source) => source,
        Open::AwaitingData => return Ok(None),
    };

    let selected = source.select_video()?;
    let decoder = match VideoDecoder::open(selected, config.port)? {
        DecoderOpen::Ready(decoder) => decoder,
        // The probe returned before the stream revealed its geometry; drop
        // the source and probe again.
        DecoderOpen::AwaitingParameters => return Ok(None),
    };

    let stream = decoder.session();
    let converter = ColorConverter::open(stream.width, stream.height, stream.source_format)?;

    log::info!(
        "session established: stream {} {} {}x{} {}",
        stream.stream_index,
        stream.codec,
        stream.width,
        stream.height,
        stream.source_format,
    );
    Ok(Some(ActiveSession {
        converter,
        decoder,
        source,
    }))
}
