/*!
    Shared types for the castview media pipeline.

    This crate defines the vocabulary of the pipeline — the types that cross
    crate boundaries. It has no dependency on FFmpeg, making it lightweight and
    enabling consumers to depend on it without pulling in FFmpeg bindings.

    # Core Types

    - [`DisplayFrame`] - A converted frame ready for display
    - [`StreamSession`] - Parameters of the currently selected input stream
    - [`PipelineState`] - Lifecycle state of the receive pipeline

    # Format Types

    - [`PixelFormat`] - Video pixel formats
    - [`CodecId`] - Codec identifiers

    # Error Handling

    - [`Error`] and [`Result`] - Common error types
    - [`ErrorKind`] - Stable tags for surfacing errors to a host
*/

mod codec;
mod error;
mod format;
mod frame;
mod session;
mod state;

pub use codec::CodecId;
pub use error::{Error, ErrorKind, Result};
pub use format::PixelFormat;
pub use frame::DisplayFrame;
pub use session::StreamSession;
pub use state::PipelineState;
