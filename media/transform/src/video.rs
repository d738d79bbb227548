/*!
    Color conversion session.
*/

use ffmpeg_next::{
    format::Pixel,
    software::scaling,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use media_decode::DecodedFrame;
use media_types::{DisplayFrame, Error, PixelFormat, Result};

/**
    A color conversion session from one source format to the display format.

    Owns the software scaler and a reused output frame (the conversion
    arena). The arena's contents are valid only until the next conversion;
    [`convert`] copies them out into an owned [`DisplayFrame`] so the consumer
    is free of that lifetime.

    [`convert`]: Self::convert
*/
pub struct ColorConverter {
    scaler: scaling::Context,
    output: VideoFrameFFmpeg,
    width: u32,
    height: u32,
    source_format: Pixel,
    next_sequence: u64,
}

impl ColorConverter {
    /**
        Create a conversion session for the given geometry and source format.

        The conversion maps to packed alpha-first ARGB at identical
        dimensions, with bilinear chroma upsampling where the source is
        subsampled.
    */
    pub fn open(width: u32, height: u32, source_format: PixelFormat) -> Result<Self> {
        let src = pixel_format_to_ffmpeg(source_format);
        let scaler = scaling::Context::get(
            src,
            width,
            height,
            Pixel::ARGB,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| {
            Error::conversion_init_failed(format!(
                "creating {source_format} to argb conversion at {width}x{height} failed: {e}"
            ))
        })?;

        log::debug!("opened {source_format} to argb conversion, {width}x{height}");
        Ok(Self {
            scaler,
            output: VideoFrameFFmpeg::new(Pixel::ARGB, width, height),
            width,
            height,
            source_format: src,
            next_sequence: 0,
        })
    }

    /**
        Convert one decoded frame into an owned display frame.

        Deterministic and synchronous. A frame whose dimensions or pixel
        format no longer match the session is fatal — the stream changed
        mid-session and a fresh session must be established.
    */
    pub fn convert(&mut self, frame: &DecodedFrame) -> Result<DisplayFrame> {
        if frame.width() != self.width
            || frame.height() != self.height
            || frame.format() != self.source_format
        {
            return Err(Error::decode_failed(
                format!(
                    "stream parameters changed mid-session: frame is {}x{} {:?}, session is {}x{} {:?}",
                    frame.width(),
                    frame.height(),
                    frame.format(),
                    self.width,
                    self.height,
                    self.source_format,
                ),
                None,
            ));
        }

        self.scaler
            .run(frame.raw(), &mut self.output)
            .map_err(|e| {
                Error::decode_failed(format!("color conversion failed: {e}"), None)
            })?;

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Ok(copy_packed(&self.output, self.width, self.height, sequence))
    }
}

impl std::fmt::Debug for ColorConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorConverter")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("source_format", &self.source_format)
            .field("next_sequence", &self.next_sequence)
            .finish_non_exhaustive()
    }
}

/**
    Copy the arena's pixels into a tightly packed display frame.

    The native frame may carry row padding; rows are repacked so the
    published stride is always `width * 4`.
*/
fn copy_packed(output: &VideoFrameFFmpeg, width: u32, height: u32, sequence: u64) -> DisplayFrame {
    let data = output.data(0);
    let stride = output.stride(0);
    let packed = width as usize * DisplayFrame::BYTES_PER_PIXEL;

    let pixels = if stride == packed {
        data[..packed * height as usize].to_vec()
    } else {
        let mut pixels = Vec::with_capacity(packed * height as usize);
        for y in 0..height as usize {
            let row = y * stride;
            pixels.extend_from_slice(&data[row..row + packed]);
        }
        pixels
    };

    DisplayFrame::new(pixels, width, height, packed, sequence)
}

/**
    Map a pipeline pixel format onto its FFmpeg equivalent.
*/
fn pixel_format_to_ffmpeg(format: PixelFormat) -> Pixel {
    match format {
        PixelFormat::Yuv420p => Pixel::YUV420P,
        PixelFormat::Yuvj420p => Pixel::YUVJ420P,
        PixelFormat::Nv12 => Pixel::NV12,
        PixelFormat::Yuv422p => Pixel::YUV422P,
        PixelFormat::Yuv444p => Pixel::YUV444P,
        PixelFormat::Yuv420p10 => Pixel::YUV420P10LE,
        PixelFormat::Argb => Pixel::ARGB,
        // `PixelFormat` is `#[non_exhaustive]`, so a wildcard is required across
        // the crate boundary; every variant that exists today is handled above.
        _ => unreachable!("unhandled PixelFormat variant: {format:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_types::ErrorKind;

    const WIDTH: u32 = 64;
    const HEIGHT: u32 = 48;

    /**
        A flat mid-gray YUV 4:2:0 frame.
    */
    fn gray_frame(width: u32, height: u32) -> DecodedFrame {
        ffmpeg_next::init().expect("init");
        let mut frame = VideoFrameFFmpeg::new(Pixel::YUV420P, width, height);
        frame.data_mut(0).fill(128);
        frame.data_mut(1).fill(128);
        frame.data_mut(2).fill(128);
        DecodedFrame::new(frame)
    }

    #[test]
    fn converts_to_packed_argb() {
        let mut converter =
            ColorConverter::open(WIDTH, HEIGHT, PixelFormat::Yuv420p).expect("open");
        let display = converter.convert(&gray_frame(WIDTH, HEIGHT)).expect("convert");

        assert_eq!(display.width, WIDTH);
        assert_eq!(display.height, HEIGHT);
        assert_eq!(display.stride, WIDTH as usize * 4);
        assert_eq!(display.data.len(), DisplayFrame::expected_len(WIDTH, HEIGHT));

        // Mid-gray in, mid-gray out: opaque alpha, all channels near 128.
        let pixel = &display.row(HEIGHT / 2)[..4];
        assert_eq!(pixel[0], 0xff, "alpha byte must lead and be opaque");
        for channel in &pixel[1..] {
            assert!(
                (110..=145).contains(channel),
                "expected mid-gray, got {pixel:?}"
            );
        }
    }

    #[test]
    fn sequence_numbers_increase() {
        let mut converter =
            ColorConverter::open(WIDTH, HEIGHT, PixelFormat::Yuv420p).expect("open");
        let frame = gray_frame(WIDTH, HEIGHT);

        let first = converter.convert(&frame).expect("convert");
        let second = converter.convert(&frame).expect("convert");
        let third = converter.convert(&frame).expect("convert");

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(third.sequence, 2);
    }

    #[test]
    fn dimension_change_is_fatal() {
        let mut converter =
            ColorConverter::open(WIDTH, HEIGHT, PixelFormat::Yuv420p).expect("open");

        let err = converter
            .convert(&gray_frame(WIDTH / 2, HEIGHT / 2))
            .expect_err("mismatched frame must be rejected");
        assert_eq!(err.kind(), ErrorKind::DecodeFailed);
    }
}
