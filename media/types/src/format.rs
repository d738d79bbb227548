/*!
    Pixel format types.
*/

use std::fmt;

/**
    Video pixel formats.

    This is a subset of formats commonly produced by software video decoders,
    plus the fixed display format the pipeline converts into. Not all FFmpeg
    pixel formats are represented.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Planar YUV 4:2:0, full range (JPEG-style)
    Yuvj420p,
    /// Semi-planar YUV 4:2:0, 12bpp (common hardware decoder output)
    Nv12,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Planar YUV 4:2:0, 10-bit (HDR content)
    Yuv420p10,
    /// Packed ARGB, 32bpp, alpha first — the fixed display format
    Argb,
}

impl PixelFormat {
    /**
        Returns true if this is a planar format.
    */
    pub const fn is_planar(self) -> bool {
        match self {
            Self::Yuv420p
            | Self::Yuvj420p
            | Self::Yuv422p
            | Self::Yuv444p
            | Self::Yuv420p10 => true,
            Self::Nv12 => true, // semi-planar counts as planar
            Self::Argb => false,
        }
    }

    /**
        Returns true if this format stores chroma at reduced resolution and
        therefore requires upsampling during display conversion.
    */
    pub const fn is_chroma_subsampled(self) -> bool {
        matches!(
            self,
            Self::Yuv420p | Self::Yuvj420p | Self::Nv12 | Self::Yuv422p | Self::Yuv420p10
        )
    }

    /**
        Returns true if this is the fixed display format.
    */
    pub const fn is_display(self) -> bool {
        matches!(self, Self::Argb)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Yuv420p => "yuv420p",
            Self::Yuvj420p => "yuvj420p",
            Self::Nv12 => "nv12",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Yuv420p10 => "yuv420p10",
            Self::Argb => "argb",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_formats() {
        assert!(PixelFormat::Yuv420p.is_planar());
        assert!(PixelFormat::Nv12.is_planar());
        assert!(!PixelFormat::Argb.is_planar());
    }

    #[test]
    fn chroma_subsampling() {
        assert!(PixelFormat::Yuv420p.is_chroma_subsampled());
        assert!(PixelFormat::Yuv422p.is_chroma_subsampled());
        assert!(!PixelFormat::Yuv444p.is_chroma_subsampled());
        assert!(!PixelFormat::Argb.is_chroma_subsampled());
    }

    #[test]
    fn display_format() {
        assert!(PixelFormat::Argb.is_display());
        assert!(!PixelFormat::Yuv420p.is_display());
    }

    #[test]
    fn display_names() {
        assert_eq!(format!("{}", PixelFormat::Yuv420p), "yuv420p");
        assert_eq!(format!("{}", PixelFormat::Argb), "argb");
    }
}
