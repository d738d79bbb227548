/*!
    UDP listener and container demux.
*/

use std::sync::Once;

use ffmpeg_next::error::{
    EACCES, EADDRINUSE, EADDRNOTAVAIL, EAGAIN, EINTR, EPERM, ETIMEDOUT, EWOULDBLOCK,
};
use ffmpeg_next::{Dictionary, format};

use media_types::{Error, Result};

use crate::config::SourceConfig;

/**
    Initialize the process-wide FFmpeg state, including the network
    subsystem.

    Safe to call from multiple threads and multiple times; the underlying
    initialization runs once per process. Opening a [`UdpSource`] calls this
    implicitly; hosts that want to front-load the work may call it at startup.
    Deinitialization is left to process teardown.
*/
pub fn init() -> Result<()> {
    ffmpeg_next::init()
        .map_err(|e| Error::open_failed(format!("FFmpeg initialization failed: {e}"), None))?;

    static NETWORK: Once = Once::new();
    NETWORK.call_once(format::network::init);
    Ok(())
}

/**
    One compressed access unit demuxed from the container.

    Owns the packet data for exactly the hand-off from demuxer to decoder.
*/
pub struct AccessUnit {
    packet: ffmpeg_next::Packet,
}

impl AccessUnit {
    /**
        Wrap one demuxed compressed packet.
    */
    pub fn new(packet: ffmpeg_next::Packet) -> Self {
        Self { packet }
    }

    /**
        Create an access unit by copying raw compressed bytes.
    */
    pub fn from_data(data: &[u8]) -> Self {
        Self::new(ffmpeg_next::Packet::copy(data))
    }

    /**
        The underlying packet.
    */
    pub fn packet(&self) -> &ffmpeg_next::Packet {
        &self.packet
    }

    /**
        The compressed payload, if any.
    */
    pub fn data(&self) -> Option<&[u8]> {
        self.packet.data()
    }

    /**
        Returns true if this unit starts a keyframe.
    */
    pub fn is_key(&self) -> bool {
        self.packet.is_key()
    }
}

/**
    Outcome of opening the listener and probing the container.
*/
pub enum Open {
    /// The probe found streams; the source is ready for selection.
    Ready(UdpSource),
    /// The listener is reachable but no stream data arrived within the
    /// probe timeout. Not an error — retry after a short delay.
    AwaitingData,
}

/**
    Outcome of a single non-blocking read attempt.
*/
pub enum ReadOutcome {
    /// One access unit from the selected stream.
    Unit(AccessUnit),
    /// No data currently available; retry after a bounded delay.
    WouldBlock,
    /// The input signalled end of stream.
    EndOfStream,
}

/**
    A bound UDP listener with a probed container on top.

    The demux layer is configured for minimal buffering and minimal decode
    delay, and every native read is bounded by the configured timeout. The
    source is owned by exactly one thread for its entire lifetime; dropping it
    releases the demuxer and closes the socket.
*/
pub struct UdpSource {
    input: format::context::Input,
    port: u16,
}

impl UdpSource {
    /**
        Bind the listener and probe the container.

        FFmpeg fuses socket open and stream probing, so the absence of a
        producer surfaces here as a probe timeout; that case is reported as
        [`Open::AwaitingData`] rather than an error, because "no stream yet"
        and "stream currently unavailable" are indistinguishable on an
        unconnected datagram transport.
    */
    pub fn open(config: &SourceConfig) -> Result<Open> {
        init()?;

        let url = config.url();
        let timeout = config.read_timeout.as_micros().to_string();
        let mut options = Dictionary::new();
        options.set("fflags", "nobuffer");
        options.set("flags", "low_delay");
        // Bound every native read; both spellings so the cap holds at the
        // datagram layer and at the generic protocol layer.
        options.set("timeout", &timeout);
        options.set("rw_timeout", &timeout);

        match format::input_with_dictionary(&url, options) {
            Ok(input) => {
                log::debug!(
                    "probed {} stream(s) on udp port {}",
                    input.streams().count(),
                    config.port
                );
                Ok(Open::Ready(Self {
                    input,
                    port: config.port,
                }))
            }
            Err(e) if is_would_block(&e) => Ok(Open::AwaitingData),
            Err(e) if is_bind_failure(&e) => Err(Error::open_failed(
                format!("could not bind udp port {}: {e}", config.port),
                error_code(&e),
            )),
            Err(e) => Err(Error::probe_failed(
                format!("probing stream on udp port {} failed: {e}", config.port),
                error_code(&e),
            )),
        }
    }

    /**
        The port this listener is bound to.
    */
    pub fn port(&self) -> u16 {
        self.port
    }

    /**
        The probed container, for stream inspection.
    */
    pub(crate) fn input(&self) -> &format::context::Input {
        &self.input
    }

    /**
        Read the next access unit of the given stream.

        Units belonging to other elementary streams are discarded inline.
        Returns [`ReadOutcome::WouldBlock`] when no data is currently
        available; the caller is responsible for a bounded retry delay.
    */
    pub fn read_unit(&mut self, stream_index: usize) -> Result<ReadOutcome> {
        loop {
            let mut packet = ffmpeg_next::Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == stream_index {
                        return Ok(ReadOutcome::Unit(AccessUnit::new(packet)));
                    }
                }
                Err(ffmpeg_next::Error::Eof) => return Ok(ReadOutcome::EndOfStream),
                Err(e) if is_would_block(&e) => return Ok(ReadOutcome::WouldBlock),
                Err(e) => {
                    return Err(Error::read_failed(
                        format!("reading access unit failed: {e}"),
                        error_code(&e),
                    ));
                }
            }
        }
    }
}

impl std::fmt::Debug for UdpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpSource")
            .field("port", &self.port)
            .field("streams", &self.input.streams().count())
            .finish_non_exhaustive()
    }
}

/**
    Returns true if the error means "no data available right now".

    The UDP protocol layer raises `ETIMEDOUT` when the configured read
    timeout elapses; non-blocking reads surface `EAGAIN`/`EWOULDBLOCK`, and an
    interrupted wait surfaces `EINTR`. None of these are failures.
*/
fn is_would_block(e: &ffmpeg_next::Error) -> bool {
    matches!(
        *e,
        ffmpeg_next::Error::Other { errno }
            if errno == ETIMEDOUT
                || errno == EAGAIN
                || errno == EWOULDBLOCK
                || errno == EINTR
    )
}

/**
    Returns true if the error means the socket itself could not be bound.
*/
fn is_bind_failure(e: &ffmpeg_next::Error) -> bool {
    matches!(
        *e,
        ffmpeg_next::Error::Other { errno }
            if errno == EADDRINUSE
                || errno == EADDRNOTAVAIL
                || errno == EACCES
                || errno == EPERM
    )
}

/**
    The native error code carried by an FFmpeg error, if any.
*/
fn error_code(e: &ffmpeg_next::Error) -> Option<i32> {
    match *e {
        ffmpeg_next::Error::Other { errno } => Some(errno),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_types::ErrorKind;

    fn errno(errno: i32) -> ffmpeg_next::Error {
        ffmpeg_next::Error::Other { errno }
    }

    #[test]
    fn would_block_classification() {
        assert!(is_would_block(&errno(ETIMEDOUT)));
        assert!(is_would_block(&errno(EAGAIN)));
        assert!(is_would_block(&errno(EINTR)));
        assert!(!is_would_block(&errno(EADDRINUSE)));
        assert!(!is_would_block(&ffmpeg_next::Error::Eof));
        assert!(!is_would_block(&ffmpeg_next::Error::InvalidData));
    }

    #[test]
    fn bind_failure_classification() {
        assert!(is_bind_failure(&errno(EADDRINUSE)));
        assert!(is_bind_failure(&errno(EACCES)));
        assert!(!is_bind_failure(&errno(ETIMEDOUT)));
        assert!(!is_bind_failure(&ffmpeg_next::Error::InvalidData));
    }

    #[test]
    fn error_codes() {
        assert_eq!(error_code(&errno(ETIMEDOUT)), Some(ETIMEDOUT));
        assert_eq!(error_code(&ffmpeg_next::Error::Eof), None);
    }

    #[test]
    fn access_unit_from_data() {
        let unit = AccessUnit::from_data(&[1, 2, 3, 4]);
        assert_eq!(unit.data(), Some(&[1u8, 2, 3, 4][..]));
    }

    #[test]
    fn open_without_producer_awaits_data() {
        // Nothing is streaming to this port, so the probe must time out
        // without reporting an error.
        let mut config = SourceConfig::new(42841);
        config.read_timeout = std::time::Duration::from_millis(50);

        match UdpSource::open(&config) {
            Ok(Open::AwaitingData) => {}
            Ok(Open::Ready(_)) => panic!("probe found streams on a silent port"),
            Err(e) => panic!("expected AwaitingData, got error: {e}"),
        }
    }

    #[test]
    fn open_on_occupied_port_fails() {
        // Hold the port with a plain socket so the listener cannot bind.
        let blocker = std::net::UdpSocket::bind("0.0.0.0:42842").expect("bind blocker");

        let mut config = SourceConfig::new(42842);
        config.read_timeout = std::time::Duration::from_millis(50);

        match UdpSource::open(&config) {
            Err(e) => assert_eq!(e.kind(), ErrorKind::OpenFailed),
            Ok(Open::AwaitingData) => panic!("bind conflict reported as awaiting data"),
            Ok(Open::Ready(_)) => panic!("bind conflict reported as ready"),
        }

        drop(blocker);
    }
}
