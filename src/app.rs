//! Android entry point and lifecycle forwarding.
//!
//! Surface lifecycle callbacks from the platform are forwarded into the
//! pipeline shim; window and system-UI visibility changes drive the
//! fullscreen chrome controller.

use std::time::Instant;

use android_activity::{AndroidApp, WindowManagerFlags};
use log::{error, info};
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::application::ApplicationHandler;
use winit::event::{Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::android::EventLoopBuilderExtAndroid;
use winit::window::{Window, WindowId};

use crate::chrome::{self, FullscreenChrome};
use crate::config::PlayerConfig;
use crate::pipeline::{self, PlaybackPipeline};

struct PlayerApp {
    app: AndroidApp,
    window: Option<Window>,
    pipeline: Option<PlaybackPipeline>,
    chrome: FullscreenChrome,
    surface_live: bool,
}

impl PlayerApp {
    fn new(app: AndroidApp, pipeline: Option<PlaybackPipeline>) -> Self {
        Self {
            app,
            window: None,
            pipeline,
            chrome: FullscreenChrome::new(),
            surface_live: false,
        }
    }
}

/// The ANativeWindow address behind a winit window, as the video overlay
/// expects it.
fn native_window_handle(window: &Window) -> Option<usize> {
    match window.window_handle().ok()?.as_raw() {
        RawWindowHandle::AndroidNdk(handle) => Some(handle.a_native_window.as_ptr() as usize),
        _ => None,
    }
}

impl ApplicationHandler for PlayerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        info!("PlayerApp: resumed, creating window");

        let window_attrs = Window::default_attributes().with_title("Player");
        match event_loop.create_window(window_attrs) {
            Ok(window) => self.window = Some(window),
            Err(e) => error!("PlayerApp: failed to create window: {e}"),
        }

        chrome::apply_system_ui(&self.app);
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        info!("PlayerApp: suspended, releasing surface");

        // Exactly one detach per surface lifetime, however many attach calls
        // the resize path issued.
        if self.surface_live {
            if let Some(pipeline) = &self.pipeline {
                pipeline.surface_detached();
            }
            self.surface_live = false;
        }
        self.window = None;
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("PlayerApp: close requested");
                event_loop.exit();
            }

            // The surface is usable from the first size notification onward.
            WindowEvent::Resized(size) => {
                let handle = self.window.as_ref().and_then(native_window_handle);
                if let (Some(handle), Some(pipeline)) = (handle, &self.pipeline) {
                    pipeline.surface_attached(handle, size.width, size.height);
                    self.surface_live = true;
                }
            }

            WindowEvent::Focused(true) => {
                chrome::apply_system_ui(&self.app);
            }

            // A tap while immersive brings the system bars back. The native
            // glue gets no visibility bitmask callback, so the first touch is
            // forwarded as a bars-visible notification.
            WindowEvent::Touch(Touch {
                phase: TouchPhase::Started,
                ..
            }) => {
                self.chrome
                    .on_system_ui_changed(chrome::SYSTEM_UI_FLAG_VISIBLE, Instant::now());
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.chrome.fire_due(Instant::now()) {
            info!("PlayerApp: re-hiding system chrome");
            chrome::apply_system_ui(&self.app);
        }

        match self.chrome.rehide_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

/// Android entry point
#[no_mangle]
fn android_main(app: AndroidApp) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("PlayerApp"),
    );

    info!("Player starting...");

    // Runtime init failure terminates the activity; no native calls after.
    if let Err(e) = pipeline::runtime_init() {
        error!("PlayerApp: media runtime initialization failed: {e}");
        return;
    }

    app.set_window_flags(WindowManagerFlags::FULLSCREEN, WindowManagerFlags::empty());

    let config = PlayerConfig::default();
    let pipeline = match PlaybackPipeline::new(&config.pipeline_description()) {
        Ok(pipeline) => Some(pipeline),
        Err(e) => {
            error!("PlayerApp: pipeline construction failed, continuing without playback: {e}");
            None
        }
    };

    let event_loop = EventLoop::builder()
        .with_android_app(app.clone())
        .build()
        .expect("Failed to create event loop");

    let mut player = PlayerApp::new(app, pipeline);
    event_loop.run_app(&mut player).expect("Event loop failed");
}
