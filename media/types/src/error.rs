/*!
    Error types for the castview media pipeline.
*/

use std::fmt;

/**
    Stable tag identifying the kind of a fatal pipeline error.

    Hosts surfacing errors to users can match on the kind without parsing
    messages.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The datagram listener could not be opened.
    OpenFailed,
    /// Container format or stream detection failed.
    ProbeFailed,
    /// The probed input contains no video stream.
    NoVideoStream,
    /// No decoder is registered for the selected stream's codec.
    DecoderUnavailable,
    /// Decoder session allocation failed.
    AllocFailed,
    /// The codec session could not be opened.
    CodecOpenFailed,
    /// The color conversion session could not be created.
    ConversionInitFailed,
    /// Feeding a compressed access unit to the decoder failed fatally.
    SendFailed,
    /// Reading from the input failed fatally.
    ReadFailed,
    /// The input signalled end of stream.
    EndOfStream,
    /// The decode session failed fatally (corrupted codec state, or the
    /// stream changed dimensions/format mid-session).
    DecodeFailed,
}

impl ErrorKind {
    /**
        The stable string form of this tag.
    */
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenFailed => "open-failed",
            Self::ProbeFailed => "probe-failed",
            Self::NoVideoStream => "no-video-stream",
            Self::DecoderUnavailable => "decoder-unavailable",
            Self::AllocFailed => "alloc-failed",
            Self::CodecOpenFailed => "codec-open-failed",
            Self::ConversionInitFailed => "conversion-init-failed",
            Self::SendFailed => "send-failed",
            Self::ReadFailed => "read-failed",
            Self::EndOfStream => "end-of-stream",
            Self::DecodeFailed => "decode-failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
    Fatal pipeline error.

    Every variant is fatal to the session it occurs in: the worker releases
    its native resources and delivers the error to the host exactly once.
    Recoverable per-frame decode errors are not represented here — the decoder
    logs and absorbs them without involving the host.

    Where the failure originated in a native library call, `code` carries the
    raw native error code for diagnostics.
*/
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open stream listener: {message}")]
    OpenFailed { message: String, code: Option<i32> },
    #[error("stream probe failed: {message}")]
    ProbeFailed { message: String, code: Option<i32> },
    #[error("input contains no video stream")]
    NoVideoStream,
    #[error("no decoder available for codec {codec}")]
    DecoderUnavailable { codec: String },
    #[error("failed to allocate decoder session: {message}")]
    AllocFailed { message: String },
    #[error("failed to open codec session: {message}")]
    CodecOpenFailed { message: String, code: Option<i32> },
    #[error("failed to create conversion session: {message}")]
    ConversionInitFailed { message: String },
    #[error("failed to feed decoder: {message}")]
    SendFailed { message: String, code: Option<i32> },
    #[error("failed to read from input: {message}")]
    ReadFailed { message: String, code: Option<i32> },
    #[error("end of stream")]
    EndOfStream,
    #[error("decode session failed: {message}")]
    DecodeFailed { message: String, code: Option<i32> },
}

impl Error {
    /**
        Create an open failure with the given message and native error code.
    */
    pub fn open_failed(message: impl Into<String>, code: Option<i32>) -> Self {
        Self::OpenFailed {
            message: message.into(),
            code,
        }
    }

    /**
        Create a probe failure with the given message and native error code.
    */
    pub fn probe_failed(message: impl Into<String>, code: Option<i32>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
            code,
        }
    }

    /**
        Create a decoder-unavailable error for the given codec name.
    */
    pub fn decoder_unavailable(codec: impl Into<String>) -> Self {
        Self::DecoderUnavailable {
            codec: codec.into(),
        }
    }

    /**
        Create an allocation failure with the given message.
    */
    pub fn alloc_failed(message: impl Into<String>) -> Self {
        Self::AllocFailed {
            message: message.into(),
        }
    }

    /**
        Create a codec-open failure with the given message and native error code.
    */
    pub fn codec_open_failed(message: impl Into<String>, code: Option<i32>) -> Self {
        Self::CodecOpenFailed {
            message: message.into(),
            code,
        }
    }

    /**
        Create a conversion-init failure with the given message.
    */
    pub fn conversion_init_failed(message: impl Into<String>) -> Self {
        Self::ConversionInitFailed {
            message: message.into(),
        }
    }

    /**
        Create a send failure with the given message and native error code.
    */
    pub fn send_failed(message: impl Into<String>, code: Option<i32>) -> Self {
        Self::SendFailed {
            message: message.into(),
            code,
        }
    }

    /**
        Create a read failure with the given message and native error code.
    */
    pub fn read_failed(message: impl Into<String>, code: Option<i32>) -> Self {
        Self::ReadFailed {
            message: message.into(),
            code,
        }
    }

    /**
        Create a decode-session failure with the given message and native
        error code.
    */
    pub fn decode_failed(message: impl Into<String>, code: Option<i32>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
            code,
        }
    }

    /**
        The stable kind tag for this error.
    */
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OpenFailed { .. } => ErrorKind::OpenFailed,
            Self::ProbeFailed { .. } => ErrorKind::ProbeFailed,
            Self::NoVideoStream => ErrorKind::NoVideoStream,
            Self::DecoderUnavailable { .. } => ErrorKind::DecoderUnavailable,
            Self::AllocFailed { .. } => ErrorKind::AllocFailed,
            Self::CodecOpenFailed { .. } => ErrorKind::CodecOpenFailed,
            Self::ConversionInitFailed { .. } => ErrorKind::ConversionInitFailed,
            Self::SendFailed { .. } => ErrorKind::SendFailed,
            Self::ReadFailed { .. } => ErrorKind::ReadFailed,
            Self::EndOfStream => ErrorKind::EndOfStream,
            Self::DecodeFailed { .. } => ErrorKind::DecodeFailed,
        }
    }

    /**
        The native error code behind this failure, if one was captured.
    */
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::OpenFailed { code, .. }
            | Self::ProbeFailed { code, .. }
            | Self::CodecOpenFailed { code, .. }
            | Self::SendFailed { code, .. }
            | Self::ReadFailed { code, .. }
            | Self::DecodeFailed { code, .. } => *code,
            _ => None,
        }
    }
}

/**
    Result type alias for the castview media pipeline.
*/
pub type Result<T> = std::result::Result<T, Error>;

// Errors cross the worker/host thread boundary.
static_assertions::assert_impl_all!(Error: Send, Sync);
