/*!
    UDP transport-stream input for the castview media pipeline.

    This crate owns the passive datagram listener and the container demux
    layer. It binds a UDP port, probes the multiplexed stream, selects the
    video elementary stream, and hands out compressed access units one at a
    time without ever blocking indefinitely.

    # Example

    ```ignore
    use media_source::{Open, ReadOutcome, SourceConfig, UdpSource};

    let config = SourceConfig::new(5555);
    let mut source = loop {
        match UdpSource::open(&config)? {
            Open::Ready(source) => break source,
            // No producer on the wire yet — retry after a short delay.
            Open::AwaitingData => std::thread::sleep(config.read_timeout),
        }
    };

    let selected = source.select_video()?;
    loop {
        match source.read_unit(selected.index)? {
            ReadOutcome::Unit(unit) => decode(unit),
            ReadOutcome::WouldBlock => std::thread::sleep(RETRY_DELAY),
            ReadOutcome::EndOfStream => break,
        }
    }
    ```

    # Low latency

    The listener is opened with `fflags=nobuffer` and `flags=low_delay` so the
    demux layer never holds data back to build a buffer, and with a protocol
    read timeout so no native call blocks longer than
    [`SourceConfig::read_timeout`]. "No data right now" surfaces as
    [`ReadOutcome::WouldBlock`] (or [`Open::AwaitingData`] during the probe),
    never as an error.
*/

mod config;
mod input;
mod select;

pub use config::{DEFAULT_PORT, SourceConfig};
pub use input::{AccessUnit, Open, ReadOutcome, UdpSource, init};
pub use select::{CodecConfig, SelectedStream};
