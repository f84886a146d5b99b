//! Runs the target data overlay with a demo telemetry feed.

mod app;
mod canvas;
mod config;
mod demo;
mod display;
mod frame;
mod telemetry;

use crate::config::DisplayConfig;
use crate::demo::TestPatternSource;
use crate::display::TargetDisplay;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("gimbal-viz {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));

    let mut display = TargetDisplay::new(DisplayConfig::default());
    display.set_video_source(Arc::new(TestPatternSource::new(640, 360)));
    display.set_close_callback(|| log::info!("display closed by user"));
    if !display.start_display() {
        return;
    }

    // Feed synthetic readings at ~10 Hz until the window is closed.
    let start = Instant::now();
    while display.is_running() {
        display.update_telemetry(demo::synthetic_target_data(start.elapsed().as_secs_f64()));
        thread::sleep(Duration::from_millis(100));
    }
    display.stop_display();
}
