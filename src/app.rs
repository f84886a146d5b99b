//! Overlay render loop and eframe integration.
//!
//! One update per refresh tick: sample the telemetry snapshot under its
//! lock, composite the latest video frame onto a fresh copy of the dark
//! canvas, upload it as the frame texture, then paint the label/value
//! grid and footer on top.

use crate::canvas::OverlayCanvas;
use crate::config::DisplayConfig;
use crate::display::Shared;
use crate::telemetry::{
    format_angle, format_coordinate, format_distance, format_height, format_timestamp,
    TelemetrySnapshot,
};
use egui::{Align2, Color32, FontId, Pos2, Rect};
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) const COLOR_BACKGROUND: Color32 = Color32::from_rgb(30, 30, 30);
const COLOR_TITLE: Color32 = Color32::from_rgb(255, 255, 255);
const COLOR_LABEL: Color32 = Color32::from_rgb(150, 150, 255);
const COLOR_VALUE: Color32 = Color32::from_rgb(0, 255, 0);
const COLOR_DISABLED: Color32 = Color32::from_rgb(255, 0, 0);
const COLOR_MUTED: Color32 = Color32::from_rgb(150, 150, 150);
const COLOR_SEPARATOR: Color32 = Color32::from_rgb(100, 100, 100);

const TITLE_FONT: f32 = 20.0;
const LABEL_FONT: f32 = 16.0;
const MARGIN: f32 = 20.0;
const HEADER_SEPARATOR_Y: f32 = 50.0;
const GRID_Y_START: f32 = 80.0;
const ROW_HEIGHT: f32 = 45.0;
const VALUE_OFFSET: f32 = 30.0;
const GRID_ROWS: f32 = 4.0;

/// Vertical extent of the grid plus the separator under it: four row
/// advances from the grid start, then the same gap the header uses.
fn video_separator_y() -> f32 {
    GRID_Y_START + GRID_ROWS * ROW_HEIGHT + ROW_HEIGHT + 10.0
}

/// Region left for the composited video frame, as (top, width, height),
/// or `None` when the configured window is too small to leave one.
pub(crate) fn video_area(window_size: [f32; 2]) -> Option<(f32, f32, f32)> {
    let top = video_separator_y() + 10.0;
    let height = window_size[1] - top - MARGIN;
    let width = window_size[0] - 2.0 * MARGIN;
    if height < 1.0 || width < 1.0 {
        return None;
    }
    Some((top, width, height))
}

pub(crate) struct OverlayApp {
    shared: Arc<Shared>,
    config: DisplayConfig,
    canvas: OverlayCanvas,
    texture: egui::TextureHandle,
}

impl OverlayApp {
    pub(crate) fn new(
        cc: &eframe::CreationContext<'_>,
        shared: Arc<Shared>,
        config: DisplayConfig,
    ) -> Self {
        let width = config.window_size[0] as usize;
        let height = config.window_size[1] as usize;
        let canvas = OverlayCanvas::new(width, height, COLOR_BACKGROUND);
        let texture = cc.egui_ctx.load_texture(
            "overlay_canvas",
            canvas.finish(canvas.begin_frame()),
            egui::TextureOptions::LINEAR,
        );
        *shared.egui_ctx.lock() = Some(cc.egui_ctx.clone());
        Self {
            shared,
            config,
            canvas,
            texture,
        }
    }

    /// Fetch, scale, and composite the newest video frame, if any.
    fn composite_video(&self, pixels: &mut [Color32]) -> Result<(), String> {
        let source = self.shared.video.lock().clone();
        let Some(source) = source else {
            return Ok(());
        };
        let Some(frame) = source.latest_frame() else {
            return Ok(());
        };
        // A window too short for a video area is valid configuration;
        // just show the grid.
        let Some((top, avail_w, avail_h)) = video_area(self.config.window_size) else {
            return Ok(());
        };
        let scaled = frame.scale_to_height(avail_h as u32, avail_w as u32)?;
        let x0 = ((self.config.window_size[0] - scaled.width() as f32) / 2.0).max(0.0) as usize;
        self.canvas.composite(pixels, &scaled, x0, top as usize);
        Ok(())
    }

    fn draw_overlay(&self, painter: &egui::Painter, snapshot: &TelemetrySnapshot) {
        let [w, _h] = self.config.window_size;
        let label_font = FontId::proportional(LABEL_FONT);
        let cell = |x: f32, y: f32, label: &str, value: String, color: Color32| {
            painter.text(
                Pos2::new(x, y),
                Align2::LEFT_BOTTOM,
                label,
                label_font.clone(),
                COLOR_LABEL,
            );
            painter.text(
                Pos2::new(x, y + VALUE_OFFSET),
                Align2::LEFT_BOTTOM,
                value,
                label_font.clone(),
                color,
            );
        };

        painter.text(
            Pos2::new(MARGIN, 30.0),
            Align2::LEFT_BOTTOM,
            "Target Data Monitor",
            FontId::proportional(TITLE_FONT),
            COLOR_TITLE,
        );
        painter.text(
            Pos2::new(w - 700.0, 30.0),
            Align2::LEFT_BOTTOM,
            format!("Update Time: {}", format_timestamp(snapshot.last_update)),
            label_font.clone(),
            COLOR_MUTED,
        );
        painter.line_segment(
            [
                Pos2::new(MARGIN, HEADER_SEPARATOR_Y),
                Pos2::new(w - MARGIN, HEADER_SEPARATOR_Y),
            ],
            egui::Stroke::new(2.0, COLOR_SEPARATOR),
        );

        let d = &snapshot.data;
        let col = w / 2.0;
        let left = MARGIN + 10.0;
        let right = col + MARGIN + 10.0;
        let mut y = GRID_Y_START;

        cell(left, y, "Z-Axis Motor Angle:", format_angle(d.z_angle), COLOR_VALUE);
        cell(right, y, "Pitch Angle:", format_angle(d.pitch_angle), COLOR_VALUE);
        y += ROW_HEIGHT;

        cell(left, y, "Roll Angle:", format_angle(d.roll_angle), COLOR_VALUE);
        cell(right, y, "Yaw Angle:", format_angle(d.yaw_angle), COLOR_VALUE);
        y += ROW_HEIGHT;

        let (range_text, range_color) = if d.range_enabled {
            ("Enabled", COLOR_VALUE)
        } else {
            ("Disabled", COLOR_DISABLED)
        };
        cell(left, y, "Range Status:", range_text.to_string(), range_color);
        y += ROW_HEIGHT;

        cell(left, y, "Distance:", format_distance(d.distance), COLOR_VALUE);
        cell(right, y, "Height:", format_height(d.height), COLOR_VALUE);
        y += ROW_HEIGHT;

        cell(left, y, "Longitude:", format_coordinate(d.longitude), COLOR_VALUE);
        cell(right, y, "Latitude:", format_coordinate(d.latitude), COLOR_VALUE);

        let sep_y = video_separator_y();
        painter.line_segment(
            [Pos2::new(MARGIN, sep_y), Pos2::new(w - MARGIN, sep_y)],
            egui::Stroke::new(2.0, COLOR_SEPARATOR),
        );

        painter.text(
            Pos2::new(MARGIN, self.config.window_size[1] - MARGIN),
            Align2::LEFT_BOTTOM,
            "Press 'q' or 'ESC' to close",
            label_font,
            COLOR_MUTED,
        );
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // An external stop_display() wins over everything else.
        if self.shared.stop.load(Ordering::SeqCst) || !self.shared.running.load(Ordering::SeqCst)
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        let snapshot = *self.shared.telemetry.lock();

        let mut pixels = self.canvas.begin_frame();
        if let Err(e) = self.composite_video(&mut pixels) {
            // A single bad iteration aborts the display rather than
            // failing over and over.
            log::error!("display loop error: {}", e);
            self.shared.running.store(false, Ordering::SeqCst);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }
        self.texture
            .set(self.canvas.finish(pixels), egui::TextureOptions::LINEAR);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = Rect::from_min_size(
                    Pos2::ZERO,
                    egui::Vec2::new(self.config.window_size[0], self.config.window_size[1]),
                );
                let painter = ui.painter();
                painter.image(
                    self.texture.id(),
                    rect,
                    Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
                self.draw_overlay(painter, &snapshot);
            });

        let close_key = ctx.input(|i| {
            i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape)
        });
        let close_requested = ctx.input(|i| i.viewport().close_requested());
        if close_key || close_requested {
            self.shared.running.store(false, Ordering::SeqCst);
            self.shared.fire_close_callback();
            if close_key {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            return;
        }

        ctx.request_repaint_after(self.config.refresh_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_area_matches_fixed_layout() {
        let (top, width, height) = video_area([1200.0, 800.0]).unwrap();
        // Grid ends at 260, last values at 290, separator at 315.
        assert_eq!(top, 325.0);
        assert_eq!(width, 1160.0);
        assert_eq!(height, 455.0);
    }

    #[test]
    fn video_area_shrinks_with_window_height() {
        let (top, _, height) = video_area([1200.0, 600.0]).unwrap();
        assert_eq!(height, 600.0 - top - 20.0);
    }

    #[test]
    fn video_area_is_absent_for_short_windows() {
        // Anything shorter than the grid plus margins leaves no video
        // region, which must not be treated as a rendering error.
        assert!(video_area([1200.0, 340.0]).is_none());
        assert!(video_area([30.0, 800.0]).is_none());
    }
}
