//! Playback pipeline shim over the GStreamer runtime.
//!
//! All demuxing, decoding and rendering happens inside GStreamer. This module
//! constructs a pipeline from a textual description, hands the platform
//! surface to the video overlay when the sink asks for it, and forwards
//! surface lifecycle transitions into pipeline state changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_video as gst_video;
use gstreamer_video::prelude::*;
use log::{debug, error, info, warn};
use thiserror::Error;

/// Errors surfaced by the pipeline shim.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("media runtime initialization failed: {0}")]
    RuntimeInit(gst::glib::Error),

    #[error("pipeline construction failed: {0}")]
    PipelineParse(gst::glib::Error),

    #[error("pipeline has no message bus")]
    NoBus,
}

/// One-time external runtime initialization. This is the only hard failure
/// path in the crate; the caller terminates on error.
pub fn runtime_init() -> Result<(), PlayerError> {
    gst::init().map_err(PlayerError::RuntimeInit)
}

/// Shared slot holding the raw native-window address the video overlay
/// renders into. The bus sync handler reads it from streaming threads.
pub(crate) struct SurfaceSlot {
    handle: Mutex<Option<usize>>,
}

impl SurfaceSlot {
    pub(crate) fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    pub(crate) fn store(&self, handle: usize) {
        if let Ok(mut slot) = self.handle.lock() {
            *slot = Some(handle);
        }
    }

    pub(crate) fn current(&self) -> Option<usize> {
        self.handle.lock().map(|slot| *slot).unwrap_or(None)
    }

    pub(crate) fn take(&self) -> Option<usize> {
        self.handle.lock().map(|mut slot| slot.take()).unwrap_or(None)
    }
}

/// Owns the parsed pipeline, the surface slot and the bus-watch thread.
/// The external pipeline is released exactly once, on drop.
pub struct PlaybackPipeline {
    playbin: gst::Element,
    surface: Arc<SurfaceSlot>,
    running: Arc<AtomicBool>,
    bus_thread: Option<JoinHandle<()>>,
}

impl PlaybackPipeline {
    /// Parses `description` and installs the bus plumbing. The pipeline stays
    /// in the NULL state until a surface is attached.
    pub fn new(description: &str) -> Result<Self, PlayerError> {
        info!("PlaybackPipeline: creating pipeline from {description:?}");

        let playbin = gst::parse::launch(description).map_err(PlayerError::PipelineParse)?;
        let bus = playbin.bus().ok_or(PlayerError::NoBus)?;

        let surface = Arc::new(SurfaceSlot::new());

        // The video sink asks for its window handle on a streaming thread;
        // answer from the slot and drop the message.
        let slot = Arc::clone(&surface);
        bus.set_sync_handler(move |_bus, msg| {
            if !gst_video::is_video_overlay_prepare_window_handle_message(msg) {
                return gst::BusSyncReply::Pass;
            }
            let overlay = msg
                .src()
                .and_then(|src| src.dynamic_cast_ref::<gst_video::VideoOverlay>());
            match (slot.current(), overlay) {
                (Some(handle), Some(overlay)) => unsafe { overlay.set_window_handle(handle) },
                _ => warn!("PlaybackPipeline: window handle requested with no surface attached"),
            }
            gst::BusSyncReply::Drop
        });

        let running = Arc::new(AtomicBool::new(true));
        let watcher = Arc::clone(&running);
        let bus_thread = Some(thread::spawn(move || run_bus_watch(bus, watcher)));

        Ok(Self {
            playbin,
            surface,
            running,
            bus_thread,
        })
    }

    /// Surface created/changed: store the handle and start playback.
    /// Re-attaching replaces the stored handle.
    pub fn surface_attached(&self, handle: usize, width: u32, height: u32) {
        info!("PlaybackPipeline: surface attached ({width}x{height})");
        self.surface.store(handle);
        if let Err(e) = self.playbin.set_state(gst::State::Playing) {
            error!("PlaybackPipeline: failed to start playback: {e}");
        }
    }

    /// Surface destroyed: park the pipeline and forget the handle. Safe to
    /// call again; a second call finds no stored surface.
    pub fn surface_detached(&self) {
        if self.surface.take().is_some() {
            info!("PlaybackPipeline: surface detached");
        } else {
            debug!("PlaybackPipeline: surface detach with no surface attached");
        }
        if let Err(e) = self.playbin.set_state(gst::State::Null) {
            error!("PlaybackPipeline: failed to stop playback: {e}");
        }
    }
}

impl Drop for PlaybackPipeline {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.bus_thread.take() {
            let _ = handle.join();
        }
        if let Some(bus) = self.playbin.bus() {
            bus.unset_sync_handler();
        }
        if let Err(e) = self.playbin.set_state(gst::State::Null) {
            error!("PlaybackPipeline: failed to release pipeline: {e}");
        }
        info!("PlaybackPipeline: released");
    }
}

/// Drains bus messages until shutdown. No recovery policy: log and continue.
fn run_bus_watch(bus: gst::Bus, running: Arc<AtomicBool>) {
    use gst::MessageView;

    while running.load(Ordering::SeqCst) {
        let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(100)) else {
            continue;
        };
        match msg.view() {
            MessageView::Error(err) => {
                error!(
                    "PlaybackPipeline: bus error from {:?}: {} ({:?})",
                    err.src().map(|src| src.path_string()),
                    err.error(),
                    err.debug()
                );
            }
            MessageView::Warning(w) => {
                warn!("PlaybackPipeline: bus warning: {}", w.error());
            }
            MessageView::Eos(_) => {
                info!("PlaybackPipeline: end of stream");
            }
            MessageView::StateChanged(s) => {
                debug!("PlaybackPipeline: state {:?} -> {:?}", s.old(), s.current());
            }
            MessageView::Buffering(b) => {
                debug!("PlaybackPipeline: buffering {}%", b.percent());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_starts_empty() {
        let slot = SurfaceSlot::new();
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn store_replaces_the_handle() {
        let slot = SurfaceSlot::new();
        slot.store(0x1000);
        slot.store(0x2000);
        assert_eq!(slot.current(), Some(0x2000));
    }

    #[test]
    fn take_clears_and_is_idempotent() {
        let slot = SurfaceSlot::new();
        slot.store(0x1000);

        assert_eq!(slot.take(), Some(0x1000));
        assert_eq!(slot.take(), None);
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn missing_bus_error_display() {
        assert_eq!(PlayerError::NoBus.to_string(), "pipeline has no message bus");
    }
}
