/*!
    Video stream selection.
*/

use ffmpeg_next::codec;
use ffmpeg_next::media;

use media_types::{CodecId, Error, Result};

use crate::input::UdpSource;

/**
    Codec configuration for the selected stream.

    An owned handle to the stream's codec parameters, carried from the
    demuxer to the decoder so the decode session can be configured without
    reaching back into the container.
*/
pub struct CodecConfig {
    parameters: codec::Parameters,
}

impl CodecConfig {
    /**
        Wrap codec parameters describing one stream.
    */
    pub fn new(parameters: codec::Parameters) -> Self {
        Self { parameters }
    }

    /**
        The FFmpeg codec id carried by these parameters.
    */
    pub fn codec_id(&self) -> codec::Id {
        self.parameters.id()
    }

    /**
        Consume the config, yielding the raw codec parameters.
    */
    pub fn into_parameters(self) -> codec::Parameters {
        self.parameters
    }
}

/**
    The selected video stream.
*/
pub struct SelectedStream {
    /// Index of the stream within the container.
    pub index: usize,
    /// Resolved codec identity.
    pub codec: CodecId,
    /// Codec parameters for opening a decode session.
    pub config: CodecConfig,
}

impl UdpSource {
    /**
        Select the first video stream of the probed container.

        Selection is deterministic and first-match — no quality or bitrate
        heuristic. Fails with [`Error::NoVideoStream`] if the container has no
        video stream, and with [`Error::DecoderUnavailable`] if no decoder is
        registered for the stream's codec.
    */
    pub fn select_video(&self) -> Result<SelectedStream> {
        let stream = self
            .input()
            .streams()
            .find(|s| s.parameters().medium() == media::Type::Video)
            .ok_or(Error::NoVideoStream)?;

        let parameters = stream.parameters();
        let id = parameters.id();
        let codec = codec_id_from_ffmpeg(id)
            .ok_or_else(|| Error::decoder_unavailable(format!("{id:?}").to_lowercase()))?;
        if ffmpeg_next::decoder::find(id).is_none() {
            return Err(Error::decoder_unavailable(codec.as_str()));
        }

        log::debug!("selected stream {} ({codec})", stream.index());
        Ok(SelectedStream {
            index: stream.index(),
            codec,
            config: CodecConfig::new(parameters),
        })
    }
}

/**
    Map an FFmpeg codec id into the pipeline's codec vocabulary.
*/
fn codec_id_from_ffmpeg(id: codec::Id) -> Option<CodecId> {
    match id {
        codec::Id::H264 => Some(CodecId::H264),
        codec::Id::HEVC => Some(CodecId::H265),
        codec::Id::MPEG1VIDEO => Some(CodecId::Mpeg1Video),
        codec::Id::MPEG2VIDEO => Some(CodecId::Mpeg2Video),
        codec::Id::MPEG4 => Some(CodecId::Mpeg4),
        codec::Id::VP8 => Some(CodecId::Vp8),
        codec::Id::VP9 => Some(CodecId::Vp9),
        codec::Id::AV1 => Some(CodecId::Av1),
        _ => None,
    }
}
