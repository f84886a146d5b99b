//! CPU canvas the overlay is composited on.
//!
//! Keeps one cleared background buffer and hands out a fresh copy each
//! frame, so no iteration ever draws over stale content. Video frames
//! are blitted in on the CPU, with per-pixel alpha blending when the
//! source carries a 4th channel.

use crate::frame::VideoFrame;
use egui::{Color32, ColorImage};

pub struct OverlayCanvas {
    width: usize,
    height: usize,
    base: Vec<Color32>,
}

impl OverlayCanvas {
    pub fn new(width: usize, height: usize, fill: Color32) -> Self {
        Self {
            width,
            height,
            base: vec![fill; width * height],
        }
    }

    /// Fresh copy of the cleared background for this iteration.
    pub fn begin_frame(&self) -> Vec<Color32> {
        self.base.clone()
    }

    /// Blit `frame` into `pixels` with its top-left corner at (x0, y0),
    /// clipped to the canvas bounds. RGBA frames blend per pixel with
    /// `dst = dst*(1-a) + src*a`; RGB frames overwrite the region.
    pub fn composite(&self, pixels: &mut [Color32], frame: &VideoFrame, x0: usize, y0: usize) {
        let cols = (frame.width() as usize).min(self.width.saturating_sub(x0));
        let rows = (frame.height() as usize).min(self.height.saturating_sub(y0));
        match frame {
            VideoFrame::Rgb(img) => {
                for y in 0..rows {
                    for x in 0..cols {
                        let [r, g, b] = img.get_pixel(x as u32, y as u32).0;
                        pixels[(y0 + y) * self.width + x0 + x] = Color32::from_rgb(r, g, b);
                    }
                }
            }
            VideoFrame::Rgba(img) => {
                for y in 0..rows {
                    for x in 0..cols {
                        let [r, g, b, a] = img.get_pixel(x as u32, y as u32).0;
                        let idx = (y0 + y) * self.width + x0 + x;
                        pixels[idx] = blend(pixels[idx], [r, g, b], a);
                    }
                }
            }
        }
    }

    pub fn finish(&self, pixels: Vec<Color32>) -> ColorImage {
        ColorImage {
            size: [self.width, self.height],
            pixels,
            source_size: egui::Vec2::ZERO,
        }
    }
}

fn blend(dst: Color32, src: [u8; 3], alpha: u8) -> Color32 {
    let a = alpha as f32 / 255.0;
    let mix = |d: u8, s: u8| (d as f32 * (1.0 - a) + s as f32 * a).round() as u8;
    Color32::from_rgb(
        mix(dst.r(), src[0]),
        mix(dst.g(), src[1]),
        mix(dst.b(), src[2]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn begin_frame_is_a_fresh_copy() {
        let canvas = OverlayCanvas::new(4, 4, Color32::from_rgb(30, 30, 30));
        let mut pixels = canvas.begin_frame();
        pixels[0] = Color32::RED;
        assert_eq!(canvas.begin_frame()[0], Color32::from_rgb(30, 30, 30));
    }

    #[test]
    fn rgb_frames_overwrite_the_region() {
        let canvas = OverlayCanvas::new(4, 4, Color32::BLACK);
        let mut pixels = canvas.begin_frame();
        let frame = VideoFrame::Rgb(RgbImage::from_pixel(2, 2, Rgb([200, 100, 50])));
        canvas.composite(&mut pixels, &frame, 1, 1);
        assert_eq!(pixels[1 * 4 + 1], Color32::from_rgb(200, 100, 50));
        assert_eq!(pixels[0], Color32::BLACK);
    }

    #[test]
    fn opaque_alpha_replaces_and_zero_alpha_keeps() {
        let canvas = OverlayCanvas::new(2, 1, Color32::from_rgb(10, 10, 10));
        let mut pixels = canvas.begin_frame();
        let opaque = VideoFrame::Rgba(RgbaImage::from_pixel(1, 1, Rgba([200, 0, 0, 255])));
        canvas.composite(&mut pixels, &opaque, 0, 0);
        assert_eq!(pixels[0], Color32::from_rgb(200, 0, 0));

        let clear = VideoFrame::Rgba(RgbaImage::from_pixel(1, 1, Rgba([0, 200, 0, 0])));
        canvas.composite(&mut pixels, &clear, 1, 0);
        assert_eq!(pixels[1], Color32::from_rgb(10, 10, 10));
    }

    #[test]
    fn half_alpha_blends_toward_source() {
        let canvas = OverlayCanvas::new(1, 1, Color32::from_rgb(0, 0, 0));
        let mut pixels = canvas.begin_frame();
        let frame = VideoFrame::Rgba(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 128])));
        canvas.composite(&mut pixels, &frame, 0, 0);
        let got = pixels[0].r();
        assert!((127..=129).contains(&got), "got {}", got);
    }

    #[test]
    fn composite_clips_at_canvas_edges() {
        let canvas = OverlayCanvas::new(3, 3, Color32::BLACK);
        let mut pixels = canvas.begin_frame();
        let frame = VideoFrame::Rgb(RgbImage::from_pixel(5, 5, Rgb([1, 2, 3])));
        canvas.composite(&mut pixels, &frame, 2, 2);
        assert_eq!(pixels[2 * 3 + 2], Color32::from_rgb(1, 2, 3));
        // Offsets past the canvas are a no-op.
        canvas.composite(&mut pixels, &frame, 10, 10);
    }

    #[test]
    fn finish_reports_canvas_size() {
        let canvas = OverlayCanvas::new(6, 2, Color32::BLACK);
        let image = canvas.finish(canvas.begin_frame());
        assert_eq!(image.size, [6, 2]);
        assert_eq!(image.pixels.len(), 12);
    }
}
