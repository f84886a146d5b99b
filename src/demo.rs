//! Demo feed: synthetic telemetry and a test-pattern video source.
//!
//! Stands in for the gimbal link and the RTSP decoder so the overlay can
//! be exercised without hardware. The pattern carries an alpha channel
//! with a soft-edged moving marker, so the per-pixel blend path is the
//! one being demonstrated.

use crate::frame::{FrameSource, VideoFrame};
use crate::telemetry::TargetData;
use image::{Rgba, RgbaImage};
use std::time::Instant;

pub struct TestPatternSource {
    start: Instant,
    width: u32,
    height: u32,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            start: Instant::now(),
            width,
            height,
        }
    }
}

impl FrameSource for TestPatternSource {
    fn latest_frame(&self) -> Option<VideoFrame> {
        let t = self.start.elapsed().as_secs_f64();
        let cx = (0.5 + 0.35 * (t * 0.8).cos()) * self.width as f64;
        let cy = (0.5 + 0.35 * (t * 1.1).sin()) * self.height as f64;
        let radius = self.height as f64 * 0.15;

        let mut img = RgbaImage::new(self.width, self.height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let shade = 40 + ((x / 16 + y / 16) % 2 * 20) as u8;
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < radius {
                let edge = ((radius - dist) / 4.0).clamp(0.0, 1.0);
                let alpha = 60 + (edge * 195.0) as u8;
                *pixel = Rgba([40, 220, 90, alpha]);
            } else {
                *pixel = Rgba([shade, shade, shade + 40, 200]);
            }
        }
        Some(VideoFrame::Rgba(img))
    }
}

/// Slowly wandering target readings, in raw wire units (centi-degrees
/// and centimeters).
pub fn synthetic_target_data(t: f64) -> TargetData {
    TargetData {
        z_angle: 4500.0 * (t * 0.3).sin(),
        pitch_angle: 3000.0 * (t * 0.5).sin(),
        roll_angle: 800.0 * (t * 0.9).sin(),
        yaw_angle: 18000.0 * (t * 0.1).sin(),
        distance: 125_000.0 + 20_000.0 * (t * 0.4).sin(),
        height: 150.0 + 30.0 * (t * 0.2).sin(),
        longitude: 121.5654 + 0.0005 * (t * 0.05).sin(),
        latitude: 25.0330 + 0.0005 * (t * 0.05).cos(),
        range_enabled: (t as u64 / 5) % 2 == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_frames_carry_alpha() {
        let source = TestPatternSource::new(64, 48);
        let frame = source.latest_frame().unwrap();
        assert!(matches!(frame, VideoFrame::Rgba(_)));
        assert_eq!((frame.width(), frame.height()), (64, 48));
    }

    #[test]
    fn synthetic_data_stays_in_range() {
        for i in 0..100 {
            let d = synthetic_target_data(i as f64 * 0.37);
            assert!(d.z_angle.abs() <= 4500.0);
            assert!(d.distance > 0.0);
            assert!((25.0..26.0).contains(&d.latitude));
        }
    }
}
