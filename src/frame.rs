//! Video frame types and the frame-producer seam.
//!
//! The display never talks to a decoder directly; it polls a FrameSource
//! for whatever frame is newest and tolerates absence. Frames are plain
//! RGB or RGBA buffers; a 4th channel requests per-pixel blending.

use image::imageops::{self, FilterType};
use image::{RgbImage, RgbaImage};
use std::io::Cursor;

/// Anything that can hand out the most recent decoded frame.
///
/// `latest_frame` must be non-blocking; returning `None` means no frame
/// is available yet and the overlay simply skips compositing this tick.
pub trait FrameSource: Send + Sync {
    fn latest_frame(&self) -> Option<VideoFrame>;
}

#[derive(Clone, Debug)]
pub enum VideoFrame {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl VideoFrame {
    pub fn width(&self) -> u32 {
        match self {
            VideoFrame::Rgb(img) => img.width(),
            VideoFrame::Rgba(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            VideoFrame::Rgb(img) => img.height(),
            VideoFrame::Rgba(img) => img.height(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| format!("Failed to guess format: {}", e))?;
        let img = reader
            .decode()
            .map_err(|e| format!("Failed to decode frame: {}", e))?;
        if img.color().has_alpha() {
            Ok(VideoFrame::Rgba(img.to_rgba8()))
        } else {
            Ok(VideoFrame::Rgb(img.to_rgb8()))
        }
    }

    /// Scale to a target height, deriving width from the source aspect
    /// ratio. If that width would exceed `max_width` the frame is scaled
    /// to `max_width` instead, still preserving aspect.
    pub fn scale_to_height(&self, target_height: u32, max_width: u32) -> Result<VideoFrame, String> {
        if self.width() == 0 || self.height() == 0 {
            return Err("empty video frame".to_string());
        }
        if target_height == 0 || max_width == 0 {
            return Err("video display area is empty".to_string());
        }
        let aspect = self.width() as f64 / self.height() as f64;
        let mut height = target_height;
        let mut width = (height as f64 * aspect).round().max(1.0) as u32;
        if width > max_width {
            width = max_width;
            height = ((width as f64 / aspect).round().max(1.0) as u32).min(target_height);
        }
        Ok(match self {
            VideoFrame::Rgb(img) => {
                VideoFrame::Rgb(imageops::resize(img, width, height, FilterType::Triangle))
            }
            VideoFrame::Rgba(img) => {
                VideoFrame::Rgba(imageops::resize(img, width, height, FilterType::Triangle))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn scale_derives_width_from_aspect() {
        let frame = VideoFrame::Rgb(RgbImage::new(640, 480));
        let scaled = frame.scale_to_height(240, 10_000).unwrap();
        assert_eq!((scaled.width(), scaled.height()), (320, 240));
    }

    #[test]
    fn scale_clamps_to_max_width() {
        // 4:1 source would want 1600 px wide at height 400.
        let frame = VideoFrame::Rgb(RgbImage::new(800, 200));
        let scaled = frame.scale_to_height(400, 1000).unwrap();
        assert_eq!(scaled.width(), 1000);
        assert_eq!(scaled.height(), 250);
    }

    #[test]
    fn scale_rejects_empty_frames() {
        let frame = VideoFrame::Rgb(RgbImage::new(0, 0));
        assert!(frame.scale_to_height(100, 100).is_err());
    }

    #[test]
    fn decode_keeps_alpha_channel() {
        let img = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 128]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let frame = VideoFrame::from_bytes(&bytes).unwrap();
        assert!(matches!(frame, VideoFrame::Rgba(_)));
        assert_eq!((frame.width(), frame.height()), (4, 2));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(VideoFrame::from_bytes(&[0, 1, 2, 3]).is_err());
    }
}
