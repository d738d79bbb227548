/*!
    Display-format conversion for the castview media pipeline.

    Decoders emit frames in whatever format the codec specifies — usually a
    planar, chroma-subsampled YUV layout. This crate converts each decoded
    frame into the fixed display format: packed ARGB, 8 bits per channel,
    alpha first, at identical dimensions. There is no resampling or resizing,
    only format reinterpretation and colorspace conversion; chroma upsampling
    uses a fixed bilinear filter.

    # Example

    ```ignore
    use media_transform::ColorConverter;

    let mut converter =
        ColorConverter::open(session.width, session.height, session.source_format)?;

    for frame in decoder.drain() {
        let display = converter.convert(&frame?)?;
        publisher.publish(display);
    }
    ```

    The conversion session is bound to the stream session's geometry: a frame
    whose dimensions or format differ from the session's is a fatal condition
    forcing a fresh session, never a silent reconfiguration.
*/

mod video;

pub use video::ColorConverter;
