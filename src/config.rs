//! Display configuration.
//!
//! Window geometry and refresh cadence for the overlay window. Defaults
//! match the fixed layout the grid constants in `app.rs` are tuned for.

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub window_title: String,
    /// Inner window size in points. The overlay layout assumes this does
    /// not change while the display is running.
    pub window_size: [f32; 2],
    /// Screen position of the window's top-left corner.
    pub window_position: [f32; 2],
    /// How often the render loop redraws and re-polls the video source.
    pub refresh_interval: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_title: "Target Data".to_string(),
            window_size: [1200.0, 800.0],
            window_position: [50.0, 50.0],
            refresh_interval: Duration::from_millis(33),
        }
    }
}
