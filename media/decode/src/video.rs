/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    codec::{self, Compliance, decoder::Video as VideoDecoderFFmpeg},
    ffi,
    format::Pixel,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use media_source::{AccessUnit, SelectedStream};
use media_types::{Error, PixelFormat, Result, StreamSession};

/**
    Outcome of opening a decode session.
*/
pub enum DecoderOpen {
    /// The session is open and fully parameterized.
    Ready(VideoDecoder),
    /// The probe had not yet seen enough of the stream to pin down coded
    /// dimensions or pixel format. Not an error — re-probe and try again.
    AwaitingParameters,
}

/**
    A video decode session bound to one selected stream.

    Owns the codec session for its entire lifetime; dropping the decoder
    releases it. The session is configured with low-delay semantics and
    permissive, non-strict-conformance decoding.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
    session: StreamSession,
}

impl VideoDecoder {
    /**
        Open a decode session for the selected stream.

        The codec context is configured before opening:

        - `LOW_DELAY`: emit frames as soon as they are decodable, not batched
          for reordering beyond codec necessity.
        - `FAST` + experimental compliance: permissive decoding that favors
          staying live over exactness on a lossy transport.
    */
    pub fn open(selected: SelectedStream, port: u16) -> Result<DecoderOpen> {
        ffmpeg_next::init()
            .map_err(|e| Error::alloc_failed(format!("FFmpeg initialization failed: {e}")))?;

        let SelectedStream {
            index,
            codec,
            config,
        } = selected;

        let mut context = codec::context::Context::from_parameters(config.into_parameters())
            .map_err(|e| Error::alloc_failed(format!("codec context allocation failed: {e}")))?;

        context.set_flags(codec::Flags::LOW_DELAY);
        context.compliance(Compliance::Experimental);
        unsafe {
            (*context.as_mut_ptr()).flags2 |= ffi::AV_CODEC_FLAG2_FAST as i32;
        }

        let decoder = context.decoder().video().map_err(|e| {
            Error::codec_open_failed(
                format!("opening {codec} decoder failed: {e}"),
                error_code(&e),
            )
        })?;

        let width = decoder.width();
        let height = decoder.height();
        let Some(source_format) = pixel_format_from_ffmpeg(decoder.format()) else {
            return Ok(DecoderOpen::AwaitingParameters);
        };
        if width == 0 || height == 0 {
            return Ok(DecoderOpen::AwaitingParameters);
        }

        log::debug!("opened {codec} decoder, {width}x{height} {source_format}");
        Ok(DecoderOpen::Ready(Self {
            decoder,
            session: StreamSession {
                port,
                stream_index: index,
                codec,
                width,
                height,
                source_format,
            },
        }))
    }

    /**
        The session parameters this decoder was opened with.
    */
    pub fn session(&self) -> StreamSession {
        self.session
    }

    /**
        Feed one compressed access unit.

        A corrupted unit poisons only itself: it is logged, dropped, and the
        session stays alive. Anything else that prevents the decoder from
        accepting input is fatal.
    */
    pub fn submit(&mut self, unit: &AccessUnit) -> Result<()> {
        match self.decoder.send_packet(unit.packet()) {
            Ok(()) => Ok(()),
            Err(ffmpeg_next::Error::InvalidData) => {
                log::warn!("dropping corrupted access unit");
                Ok(())
            }
            // The caller drains after every submit, so a full input queue
            // cannot persist; drop this unit and let the drain catch up.
            Err(ffmpeg_next::Error::Other {
                errno: ffmpeg_next::error::EAGAIN,
            }) => {
                log::warn!("decoder input queue full, dropping access unit");
                Ok(())
            }
            Err(ffmpeg_next::Error::Eof) => {
                Err(Error::send_failed("decoder no longer accepts input", None))
            }
            Err(e) => Err(Error::send_failed(
                format!("submitting access unit failed: {e}"),
                error_code(&e),
            )),
        }
    }

    /**
        Pull the frames decodable so far.

        The sequence is finite: it ends when the decoder reports it needs
        more input, and restarts on the next [`submit`]. Undecodable frames
        are logged and skipped; only session-level failures surface as
        errors.

        [`submit`]: Self::submit
    */
    pub fn drain(&mut self) -> Drain<'_> {
        Drain {
            decoder: self,
            done: false,
        }
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/**
    Iterator over the frames currently decodable, see [`VideoDecoder::drain`].
*/
pub struct Drain<'a> {
    decoder: &'a mut VideoDecoder,
    done: bool,
}

impl Iterator for Drain<'_> {
    type Item = Result<DecodedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let mut frame = VideoFrameFFmpeg::empty();
            match self.decoder.decoder.receive_frame(&mut frame) {
                Ok(()) => return Some(Ok(DecodedFrame { frame })),
                // Needs more input — the normal end of a drain.
                Err(ffmpeg_next::Error::Other {
                    errno: ffmpeg_next::error::EAGAIN,
                }) => {
                    self.done = true;
                    return None;
                }
                Err(ffmpeg_next::Error::Eof) => {
                    self.done = true;
                    return Some(Err(Error::EndOfStream));
                }
                Err(ffmpeg_next::Error::InvalidData) => {
                    log::warn!("dropping undecodable frame");
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(Error::decode_failed(
                        format!("receiving decoded frame failed: {e}"),
                        error_code(&e),
                    )));
                }
            }
        }
    }
}

/**
    One decoded frame.

    Owns the native frame buffer with its per-plane strides. The frame is
    held by the decoder's caller only until it is handed to the color
    converter; it is never retained past that hand-off.
*/
pub struct DecodedFrame {
    frame: VideoFrameFFmpeg,
}

impl DecodedFrame {
    /**
        Wrap a raw decoded frame.
    */
    pub fn new(frame: VideoFrameFFmpeg) -> Self {
        Self { frame }
    }

    /**
        Frame width in pixels.
    */
    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    /**
        Frame height in pixels.
    */
    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /**
        The native pixel format of the frame data.
    */
    pub fn format(&self) -> Pixel {
        self.frame.format()
    }

    /**
        The frame's format in the pipeline vocabulary, if representable.
    */
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        pixel_format_from_ffmpeg(self.format())
    }

    /**
        The underlying native frame.
    */
    pub fn raw(&self) -> &VideoFrameFFmpeg {
        &self.frame
    }
}

impl std::fmt::Debug for DecodedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedFrame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format())
            .finish()
    }
}

/**
    Map an FFmpeg pixel format into the pipeline vocabulary.
*/
fn pixel_format_from_ffmpeg(format: Pixel) -> Option<PixelFormat> {
    match format {
        Pixel::YUV420P => Some(PixelFormat::Yuv420p),
        Pixel::YUVJ420P => Some(PixelFormat::Yuvj420p),
        Pixel::NV12 => Some(PixelFormat::Nv12),
        Pixel::YUV422P => Some(PixelFormat::Yuv422p),
        Pixel::YUV444P => Some(PixelFormat::Yuv444p),
        Pixel::YUV420P10LE => Some(PixelFormat::Yuv420p10),
        _ => None,
    }
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
