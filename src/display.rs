//! Target data display component.
//!
//! Owns the lock-guarded telemetry snapshot and the lifecycle of the
//! overlay window, which runs on its own background thread so telemetry
//! producers are never blocked on rendering. The window/canvas resources
//! are touched only by that thread; writers only ever touch the lock.

use crate::app::OverlayApp;
use crate::config::DisplayConfig;
use crate::frame::FrameSource;
use crate::telemetry::{TargetData, TelemetrySnapshot};
use egui::mutex::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) type CloseCallback = Box<dyn FnOnce() + Send>;

/// State shared between the producer-facing API and the display thread.
pub(crate) struct Shared {
    pub(crate) telemetry: Mutex<TelemetrySnapshot>,
    pub(crate) running: AtomicBool,
    pub(crate) stop: AtomicBool,
    pub(crate) window_closed: AtomicBool,
    /// Set once a display thread has created the native event loop.
    /// winit allows only one event loop per process, so a second run
    /// can never succeed and is rejected before spawning anything.
    pub(crate) event_loop_spent: AtomicBool,
    pub(crate) video: Mutex<Option<Arc<dyn FrameSource>>>,
    pub(crate) on_close: Mutex<Option<CloseCallback>>,
    /// Live egui context, published by the display thread so that
    /// `stop_display` can wake a loop that is idle between repaints.
    pub(crate) egui_ctx: Mutex<Option<egui::Context>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            telemetry: Mutex::new(TelemetrySnapshot::new()),
            running: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            window_closed: AtomicBool::new(true),
            event_loop_spent: AtomicBool::new(false),
            video: Mutex::new(None),
            on_close: Mutex::new(None),
            egui_ctx: Mutex::new(None),
        }
    }

    /// Invoke the registered close callback, at most once per run.
    pub(crate) fn fire_close_callback(&self) {
        if let Some(callback) = self.on_close.lock().take() {
            callback();
        }
    }
}

pub struct TargetDisplay {
    shared: Arc<Shared>,
    config: DisplayConfig,
    thread: Option<JoinHandle<()>>,
}

impl TargetDisplay {
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new()),
            config,
            thread: None,
        }
    }

    /// Associate the frame producer polled each refresh. Stored as-is;
    /// `None` frames from it are tolerated.
    pub fn set_video_source(&self, source: Arc<dyn FrameSource>) {
        *self.shared.video.lock() = Some(source);
    }

    /// Register a callback fired once when the user closes the window
    /// (key press or window close button). Not fired on `stop_display`.
    pub fn set_close_callback(&self, callback: impl FnOnce() + Send + 'static) {
        *self.shared.on_close.lock() = Some(Box::new(callback));
    }

    /// Atomically overwrite the telemetry snapshot and stamp the update
    /// time. Safe to call from any thread while the display runs.
    pub fn update_telemetry(&self, data: TargetData) {
        self.shared.telemetry.lock().overwrite(data);
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Launch the overlay window on a background thread. Returns whether
    /// the thread was launched: `false` if the display is already
    /// running, or if a previous run has finished. The native event loop
    /// can be created only once per process, so the display cannot be
    /// restarted after `stop_display` or a user close.
    pub fn start_display(&mut self) -> bool {
        if self.is_running() {
            log::warn!("target data display is already running");
            return false;
        }
        if self.shared.event_loop_spent.load(Ordering::SeqCst) {
            log::error!(
                "target data display cannot be restarted: the native event loop \
                 can only be created once per process"
            );
            return false;
        }
        self.shared.stop.store(false, Ordering::SeqCst);
        self.shared.running.store(true, Ordering::SeqCst);
        self.shared.window_closed.store(false, Ordering::SeqCst);

        let shared = self.shared.clone();
        let config = self.config.clone();
        let spawned = thread::Builder::new()
            .name("target-display".to_string())
            .spawn(move || {
                shared.event_loop_spent.store(true, Ordering::SeqCst);
                if let Err(e) = run_window(shared.clone(), config) {
                    log::error!("display window failed: {}", e);
                }
                shared.running.store(false, Ordering::SeqCst);
                shared.window_closed.store(true, Ordering::SeqCst);
                *shared.egui_ctx.lock() = None;
                log::info!("display thread exited");
            });
        match spawned {
            Ok(handle) => {
                self.thread = Some(handle);
                log::info!("target data display thread started");
                true
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::SeqCst);
                self.shared.window_closed.store(true, Ordering::SeqCst);
                log::error!("failed to spawn display thread: {}", e);
                false
            }
        }
    }

    /// Signal the render loop to stop and wait for the window thread to
    /// exit, polling at a bounded interval. Idempotent.
    pub fn stop_display(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.stop.store(true, Ordering::SeqCst);
        if !self.shared.window_closed.load(Ordering::SeqCst) {
            // Wake a loop that is idle between repaints so it can see
            // the stop flag and tear the window down.
            if let Some(ctx) = self.shared.egui_ctx.lock().clone() {
                ctx.request_repaint();
            }
        }
        if let Some(handle) = self.thread.take() {
            while !handle.is_finished() {
                thread::sleep(JOIN_POLL_INTERVAL);
            }
            if handle.join().is_err() {
                log::error!("display thread panicked");
            }
        }
        log::info!("target data display closed");
    }
}

impl Drop for TargetDisplay {
    fn drop(&mut self) {
        self.stop_display();
    }
}

fn run_window(shared: Arc<Shared>, config: DisplayConfig) -> Result<(), String> {
    let title = config.window_title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_position(config.window_position)
            .with_resizable(false),
        // The window lives on our own thread, not the process main
        // thread, so the event loop must allow that.
        event_loop_builder: Some(Box::new(|builder| {
            #[cfg(target_os = "linux")]
            {
                winit::platform::x11::EventLoopBuilderExtX11::with_any_thread(builder, true);
                winit::platform::wayland::EventLoopBuilderExtWayland::with_any_thread(
                    builder, true,
                );
            }
            #[cfg(not(target_os = "linux"))]
            let _ = builder;
        })),
        ..Default::default()
    };
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(OverlayApp::new(cc, shared, config)))),
    )
    .map_err(|e| e.to_string())
}
