/*!
    Video decoding for the castview media pipeline.

    This crate turns compressed access units into raw decoded frames. The
    decode session is configured for live viewing: frames are emitted as soon
    as they are decodable rather than batched for reordering, and
    non-conforming input is decoded permissively rather than rejected.

    # Example

    ```ignore
    use media_decode::{DecoderOpen, VideoDecoder};

    let mut decoder = match VideoDecoder::open(selected, port)? {
        DecoderOpen::Ready(decoder) => decoder,
        DecoderOpen::AwaitingParameters => return reprobe(),
    };

    decoder.submit(&unit)?;
    for frame in decoder.drain() {
        let frame = frame?;
        // Convert and publish
    }
    ```

    # Error policy

    A corrupted access unit or an undecodable frame is a per-frame problem:
    it is logged and absorbed, and decoding continues with the next unit.
    Only session-level failures (corrupted codec state, decoder shutdown)
    surface as errors.
*/

mod video;

pub use video::{DecodedFrame, DecoderOpen, Drain, VideoDecoder};
